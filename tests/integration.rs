//! End-to-end tests: task files and datasets on disk.

use geopatch::dataset::{Domain, GeoSite, GeoSiteList};
use geopatch::{
    apply_tasks, run, DatasetReader, DatasetWriter, DomainType, Error, RunOptions, Task, TaskList,
};
use std::fs;
use std::path::Path;

fn site(code: &str, values: &[&str]) -> GeoSite {
    GeoSite::with_domains(code, values.iter().map(|v| Domain::root(*v)).collect())
}

fn write_dataset(path: &Path, list: &GeoSiteList) {
    let data = DatasetWriter::new().encode(list).unwrap();
    fs::write(path, data).unwrap();
}

fn task_list(src: &Path, dst: &Path, tasks: &str) -> TaskList {
    let json = format!(
        r#"{{"src": {:?}, "dst": {:?}, "tasks": {}}}"#,
        src.to_str().unwrap(),
        dst.to_str().unwrap(),
        tasks
    );
    TaskList::from_json(&json).unwrap()
}

#[test]
fn test_documented_scenario() {
    let mut list = GeoSiteList::from_entries(vec![site("US", &["a.com"]), site("CN", &[])]);
    let tasks = [
        Task::add("US", &["b.com"]),
        Task::copy("US", "CN"),
        Task::delete(&["US"]),
    ];

    let report = apply_tasks(&mut list, &tasks);

    assert_eq!(
        list,
        GeoSiteList::from_entries(vec![site("CN", &["a.com", "b.com"])])
    );
    assert_eq!(
        report.lines(),
        [
            "added b.com to US",
            "copied a.com from US to CN",
            "copied b.com from US to CN",
            "deleting entry for US",
        ]
    );
}

#[test]
fn test_run_edits_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("geosite.dat");
    let dst = dir.path().join("out").join("geosite.dat");

    let mut google = site("GOOGLE", &["google.com"]);
    google.domains.push(Domain::new(DomainType::Full, "www.gstatic.com"));
    write_dataset(
        &src,
        &GeoSiteList::from_entries(vec![
            site("CN", &["baidu.com", "qq.com"]),
            google,
            site("CATEGORY-ADS", &["ads.example"]),
        ]),
    );

    let tasks = task_list(
        &src,
        &dst,
        r#"[
            {"type": "remove", "country_code": "cn", "domains": ["qq.com"]},
            {"type": "copy", "src_country_code": "google", "dst_country_code": "proxy"},
            {"type": "delete", "entries": ["category-ads"]},
            {"type": "sort"}
        ]"#,
    );

    let summary = run(&tasks, &RunOptions::default()).unwrap();
    assert!(summary.written);
    assert_eq!(summary.report.tasks_applied, 3);
    assert_eq!(summary.report.tasks_ignored, 1);
    assert_eq!(summary.sha256.len(), 64);

    let edited = DatasetReader::open(&dst).unwrap();
    assert_eq!(
        edited.country_codes().collect::<Vec<_>>(),
        ["CN", "GOOGLE", "proxy"]
    );
    assert_eq!(edited.find("cn").unwrap().values().collect::<Vec<_>>(), ["baidu.com"]);
    assert_eq!(edited.find("PROXY").unwrap().domains, edited.find("google").unwrap().domains);

    // Source is left alone
    assert_eq!(DatasetReader::open(&src).unwrap().len(), 3);
}

#[test]
fn test_rerun_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geosite.dat");
    write_dataset(
        &path,
        &GeoSiteList::from_entries(vec![site("US", &["a.com"]), site("JP", &[])]),
    );

    let tasks = task_list(
        &path,
        &path,
        r#"[
            {"type": "add", "country_code": "*", "domains": ["x.com"]},
            {"type": "remove", "country_code": "us", "domains": ["a.com"]}
        ]"#,
    );

    run(&tasks, &RunOptions::default()).unwrap();
    let first = fs::read(&path).unwrap();

    let summary = run(&tasks, &RunOptions::default()).unwrap();
    assert_eq!(fs::read(&path).unwrap(), first);
    assert_eq!(summary.report.added(), 0);
    assert_eq!(summary.report.removed(), 0);
    assert_eq!(summary.report.already_existing(), 2);
}

#[test]
fn test_gzip_destination_and_source() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("geosite.dat");
    let dst = dir.path().join("geosite.dat.gz");
    write_dataset(&src, &GeoSiteList::from_entries(vec![site("US", &[])]));

    let tasks = task_list(&src, &dst, r#"[{"type": "add", "country_code": "us", "domains": ["a.com"]}]"#);
    run(&tasks, &RunOptions::default()).unwrap();

    let raw = fs::read(&dst).unwrap();
    assert!(geopatch::codec::is_gzip(&raw));
    let edited = DatasetReader::open(&dst).unwrap();
    assert_eq!(edited.entries[0].values().collect::<Vec<_>>(), ["a.com"]);
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("geosite.dat");
    let dst = dir.path().join("out.dat");
    write_dataset(&src, &GeoSiteList::from_entries(vec![site("US", &[])]));

    let tasks = task_list(&src, &dst, r#"[{"type": "delete", "entries": ["us"]}]"#);
    let options = RunOptions {
        dry_run: true,
        ..Default::default()
    };

    let summary = run(&tasks, &options).unwrap();
    assert!(!summary.written);
    assert_eq!(summary.report.deleted(), 1);
    assert_eq!(summary.output_size, 0);
    assert!(!dst.exists());
}

#[test]
fn test_overrides_replace_task_file_paths() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("real.dat");
    let dst = dir.path().join("real-out.dat");
    write_dataset(&src, &GeoSiteList::from_entries(vec![site("US", &[])]));

    let tasks = task_list(&dir.path().join("missing.dat"), &dir.path().join("unused.dat"), "[]");
    let options = RunOptions {
        src_override: Some(src.to_str().unwrap().to_string()),
        dst_override: Some(dst.clone()),
        dry_run: false,
    };

    run(&tasks, &options).unwrap();
    assert!(dst.exists());
    assert!(!dir.path().join("unused.dat").exists());
}

#[test]
fn test_corrupt_source_leaves_destination_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("broken.dat");
    let dst = dir.path().join("out.dat");
    fs::write(&src, [0x0a, 0x40, 0x01]).unwrap();
    fs::write(&dst, b"previous").unwrap();

    let tasks = task_list(&src, &dst, r#"[{"type": "delete", "entries": ["us"]}]"#);
    let err = run(&tasks, &RunOptions::default()).unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
    assert_eq!(fs::read(&dst).unwrap(), b"previous");
}

#[test]
fn test_missing_source_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let tasks = task_list(&dir.path().join("nope.dat"), &dir.path().join("out.dat"), "[]");

    let err = run(&tasks, &RunOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_yaml_task_file() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("geosite.dat");
    let dst = dir.path().join("out.dat");
    write_dataset(&src, &GeoSiteList::from_entries(vec![site("cn", &["a.cn"])]));

    let yaml = format!(
        "src: {:?}\ndst: {:?}\ntasks:\n  - type: add\n    country_code: CN\n    domains: [b.cn]\n",
        src.to_str().unwrap(),
        dst.to_str().unwrap()
    );
    let task_path = dir.path().join("tasks.yaml");
    fs::write(&task_path, yaml).unwrap();

    let tasks = TaskList::from_path(&task_path).unwrap();
    let summary = run(&tasks, &RunOptions::default()).unwrap();

    assert_eq!(summary.report.lines(), ["added b.cn to cn"]);
    let edited = DatasetReader::open(&dst).unwrap();
    assert_eq!(edited.entries[0].values().collect::<Vec<_>>(), ["a.cn", "b.cn"]);
}

#[cfg(unix)]
#[test]
fn test_run_keeps_destination_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("geosite.dat");
    let dst = dir.path().join("geosite-custom.dat");
    write_dataset(&src, &GeoSiteList::from_entries(vec![site("CN", &["baidu.com"])]));

    fs::write(&dst, b"old").unwrap();
    fs::set_permissions(&dst, fs::Permissions::from_mode(0o640)).unwrap();
    run(&task_list(&src, &dst, "[]"), &RunOptions::default()).unwrap();
    assert_eq!(fs::metadata(&dst).unwrap().permissions().mode() & 0o777, 0o640);

    fs::remove_file(&dst).unwrap();
    run(&task_list(&src, &dst, "[]"), &RunOptions::default()).unwrap();
    assert_eq!(fs::metadata(&dst).unwrap().permissions().mode() & 0o777, 0o644);
}

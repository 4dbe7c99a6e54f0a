use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::bail;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use zipapply::{
    ApplyError, ArchiveApplier, ArchiveWalker, IgnoreRules, Install, Options, apply_archive,
};

enum Item<'a> {
    File(&'a str, &'a [u8]),
    Dir(&'a str),
}

fn write_archive(dir: &Path, items: &[Item<'_>], method: CompressionMethod) -> PathBuf {
    let path = dir.join("update.zip");
    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    let opts = SimpleFileOptions::default().compression_method(method);

    for item in items {
        match item {
            Item::File(name, data) => {
                zip.start_file(*name, opts).unwrap();
                zip.write_all(data).unwrap();
            }
            Item::Dir(name) => zip.add_directory(*name, opts).unwrap(),
        }
    }

    zip.finish().unwrap();
    path
}

/// The archive every scenario below starts from.
fn sample_archive(dir: &Path) -> PathBuf {
    write_archive(
        dir,
        &[
            Item::File("bin/tool", b"#!/bin/sh\necho new\n"),
            Item::Dir("bin/"),
            Item::File(".DS_Store", b"finder junk"),
            Item::File("docs/guide.txt", b"read me"),
        ],
        CompressionMethod::Deflated,
    )
}

/// Installer stand-in that records every call instead of writing.
#[derive(Default)]
struct Recorder {
    calls: RefCell<Vec<(PathBuf, Vec<u8>)>>,
}

impl Recorder {
    fn install(&self, src: &mut dyn Read, opts: &Options) -> anyhow::Result<()> {
        let mut data = Vec::new();
        src.read_to_end(&mut data)?;
        let dest = opts.target_path.clone().unwrap_or_default();
        self.calls.borrow_mut().push((dest, data));
        Ok(())
    }

    fn destinations(&self) -> Vec<PathBuf> {
        self.calls.borrow().iter().map(|(p, _)| p.clone()).collect()
    }
}

fn recording(recorder: &Recorder) -> ArchiveApplier<impl Install + '_> {
    ArchiveApplier::new(|src: &mut dyn Read, opts: &Options| recorder.install(src, opts))
}

fn under(base: &str, rel: &[&str]) -> PathBuf {
    rel.iter().fold(PathBuf::from(base), |p, s| p.join(s))
}

#[test]
fn installs_files_in_archive_order_skipping_directories_and_ignored() {
    let tmp = TempDir::new().unwrap();
    let archive = sample_archive(tmp.path());
    let recorder = Recorder::default();
    let applier = recording(&recorder);

    let installed = applier
        .apply(&archive, &Options::default().with_target_path("/opt/app"))
        .unwrap();

    assert_eq!(installed, 2);
    assert_eq!(
        recorder.destinations(),
        vec![
            under("/opt/app", &["bin", "tool"]),
            under("/opt/app", &["docs", "guide.txt"]),
        ]
    );
    let calls = recorder.calls.borrow();
    assert_eq!(calls[0].1, b"#!/bin/sh\necho new\n");
    assert_eq!(calls[1].1, b"read me");
}

#[test]
fn first_installer_failure_stops_the_walk() {
    let tmp = TempDir::new().unwrap();
    let archive = sample_archive(tmp.path());
    let attempted = RefCell::new(Vec::new());
    let applier = ArchiveApplier::new(|_: &mut dyn Read, opts: &Options| -> anyhow::Result<()> {
        let dest = opts.target_path.clone().unwrap_or_default();
        attempted.borrow_mut().push(dest.clone());
        bail!("disk full while writing {}", dest.display())
    });

    let err = applier
        .apply(&archive, &Options::default().with_target_path("/opt/app"))
        .unwrap_err();

    assert!(matches!(err, ApplyError::Visit { ref name, .. } if name == "bin/tool"));
    assert_eq!(err.entry_name(), Some("bin/tool"));
    let source = std::error::Error::source(&err).unwrap();
    assert!(source.to_string().contains("disk full"), "{source}");
    assert_eq!(attempted.into_inner(), vec![under("/opt/app", &["bin", "tool"])]);
}

#[test]
fn archive_without_installable_entries_is_a_no_op() {
    let tmp = TempDir::new().unwrap();
    let never = |_: &mut dyn Read, _: &Options| -> anyhow::Result<()> {
        panic!("installer must not be called")
    };

    let empty = write_archive(tmp.path(), &[], CompressionMethod::Stored);
    let applier = ArchiveApplier::new(never);
    let opts = Options::default().with_target_path("/opt/app");
    assert_eq!(applier.apply(&empty, &opts).unwrap(), 0);

    let only_junk = write_archive(
        tmp.path(),
        &[
            Item::Dir("bin/"),
            Item::Dir("__MACOSX/"),
            Item::File("__MACOSX/bin/._tool", b"resource fork"),
            Item::File("a/.DS_Store", b"x"),
            Item::File("x/y/__MACOSX/z.txt", b"x"),
        ],
        CompressionMethod::Deflated,
    );
    assert_eq!(applier.apply(&only_junk, &opts).unwrap(), 0);
}

#[test]
fn ignore_rules_need_an_exact_segment() {
    let tmp = TempDir::new().unwrap();
    let archive = write_archive(
        tmp.path(),
        &[
            Item::File("__MACOSXtras/readme.txt", b"kept"),
            Item::File("x/y/__MACOSX/z.txt", b"dropped"),
            Item::File("Thumbs.db", b"kept by default"),
        ],
        CompressionMethod::Stored,
    );
    let recorder = Recorder::default();
    let applier = recording(&recorder);

    applier
        .apply(&archive, &Options::default().with_target_path("/opt/app"))
        .unwrap();

    assert_eq!(
        recorder.destinations(),
        vec![
            under("/opt/app", &["__MACOSXtras", "readme.txt"]),
            under("/opt/app", &["Thumbs.db"]),
        ]
    );
}

#[test]
fn custom_ignore_rules_are_honoured() {
    let tmp = TempDir::new().unwrap();
    let archive = sample_archive(tmp.path());
    let recorder = Recorder::default();
    let applier = recording(&recorder)
        .with_ignore_rules(IgnoreRules::new(["docs"]));

    applier
        .apply(&archive, &Options::default().with_target_path("/opt/app"))
        .unwrap();

    assert_eq!(
        recorder.destinations(),
        vec![
            under("/opt/app", &["bin", "tool"]),
            under("/opt/app", &[".DS_Store"]),
        ]
    );
}

#[test]
fn target_defaults_to_executable_directory() {
    let tmp = TempDir::new().unwrap();
    let archive = sample_archive(tmp.path());
    let recorder = Recorder::default();
    let applier = recording(&recorder)
        .with_executable_resolver(|| Ok(under("/opt/app", &["bin", "updater"])));

    applier.apply(&archive, &Options::default()).unwrap();
    applier
        .apply(&archive, &Options::default().with_target_path(""))
        .unwrap();

    let expected = vec![
        under("/opt/app", &["bin", "bin", "tool"]),
        under("/opt/app", &["bin", "docs", "guide.txt"]),
    ];
    let mut twice = expected.clone();
    twice.extend(expected);
    assert_eq!(recorder.destinations(), twice);
}

#[test]
fn executable_lookup_failure_is_fatal() {
    let applier = ArchiveApplier::new(|_: &mut dyn Read, _: &Options| -> anyhow::Result<()> {
        panic!("installer must not be called")
    })
    .with_executable_resolver(|| Err(io::Error::other("no /proc")));

    let err = applier
        .apply(Path::new("does-not-exist.zip"), &Options::default())
        .unwrap_err();

    assert!(matches!(err, ApplyError::ExecutablePath(_)), "{err:?}");
    assert_eq!(err.entry_name(), None);
}

#[test]
fn unreadable_archives_fail_to_open() {
    let tmp = TempDir::new().unwrap();

    let err = apply_archive(
        tmp.path().join("missing.zip"),
        &Options::default().with_target_path(tmp.path()),
    )
    .unwrap_err();
    assert!(matches!(err, ApplyError::OpenArchive(_)), "{err:?}");

    let garbage = tmp.path().join("garbage.zip");
    fs::write(&garbage, vec![0x42u8; 4096]).unwrap();
    let err = apply_archive(&garbage, &Options::default().with_target_path(tmp.path()))
        .unwrap_err();
    assert!(matches!(err, ApplyError::OpenArchive(_)), "{err:?}");
}

#[test]
fn unsupported_compression_fails_on_that_entry() {
    let tmp = TempDir::new().unwrap();
    let archive = write_archive(
        tmp.path(),
        &[
            Item::File("first.txt", b"fine"),
            Item::File("second.txt", b"patched"),
        ],
        CompressionMethod::Stored,
    );

    // Rewrite the compression method of the second central directory record.
    let mut data = fs::read(&archive).unwrap();
    let records: Vec<usize> = data
        .windows(4)
        .enumerate()
        .filter(|(_, w)| *w == b"PK\x01\x02")
        .map(|(i, _)| i)
        .collect();
    assert_eq!(records.len(), 2);
    data[records[1] + 10..records[1] + 12].copy_from_slice(&14u16.to_le_bytes());
    fs::write(&archive, data).unwrap();

    let recorder = Recorder::default();
    let applier = recording(&recorder);
    let err = applier
        .apply(&archive, &Options::default().with_target_path("/opt/app"))
        .unwrap_err();

    assert!(matches!(err, ApplyError::OpenEntry { ref name, .. } if name == "second.txt"));
    assert_eq!(recorder.destinations(), vec![under("/opt/app", &["first.txt"])]);
}

#[test]
fn escaping_entry_names_are_rejected() {
    let tmp = TempDir::new().unwrap();
    let archive = write_archive(
        tmp.path(),
        &[Item::File("../outside.txt", b"nope")],
        CompressionMethod::Stored,
    );
    let target = tmp.path().join("app");

    let err = apply_archive(&archive, &Options::default().with_target_path(&target)).unwrap_err();

    assert!(matches!(err, ApplyError::Visit { .. }), "{err:?}");
    assert!(!tmp.path().join("outside.txt").exists());
}

#[test]
fn default_installer_replaces_files_on_disk() {
    let tmp = TempDir::new().unwrap();
    let archive = sample_archive(tmp.path());
    let target = tmp.path().join("app");
    fs::create_dir_all(target.join("bin")).unwrap();
    fs::write(target.join("bin").join("tool"), "old tool").unwrap();
    fs::write(target.join("keep.txt"), "untouched").unwrap();

    let installed = apply_archive(&archive, &Options::default().with_target_path(&target)).unwrap();

    assert_eq!(installed, 2);
    assert_eq!(
        fs::read_to_string(target.join("bin").join("tool")).unwrap(),
        "#!/bin/sh\necho new\n"
    );
    assert_eq!(
        fs::read_to_string(target.join("docs").join("guide.txt")).unwrap(),
        "read me"
    );
    assert_eq!(fs::read_to_string(target.join("keep.txt")).unwrap(), "untouched");
    assert!(!target.join(".DS_Store").exists());

    let mut bin: Vec<_> = fs::read_dir(target.join("bin"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    bin.sort();
    assert_eq!(bin, vec!["tool"]);
}

#[test]
fn walker_streams_one_entry_at_a_time() {
    let tmp = TempDir::new().unwrap();
    let big = vec![b'z'; 1 << 20];
    let archive = write_archive(
        tmp.path(),
        &[
            Item::File("z.bin", &big),
            Item::File("a.txt", b"a"),
            Item::File("m/b.txt", b"b"),
        ],
        CompressionMethod::Deflated,
    );

    let walker = ArchiveWalker::open(&archive, IgnoreRules::default()).unwrap();
    assert_eq!(walker.entries().len(), 3);

    let mut seen = Vec::new();
    let visited = walker
        .walk(|name, src| {
            // Read only a prefix; the rest of the stream is dropped unread.
            let mut head = [0u8; 1];
            src.read_exact(&mut head)?;
            seen.push((name.to_string(), head[0]));
            Ok(())
        })
        .unwrap();

    assert_eq!(visited, 3);
    assert_eq!(
        seen,
        vec![
            ("z.bin".to_string(), b'z'),
            ("a.txt".to_string(), b'a'),
            ("m/b.txt".to_string(), b'b'),
        ]
    );
}

#[test]
fn file_entry_never_displaces_a_directory() {
    let tmp = TempDir::new().unwrap();
    let archive = write_archive(
        tmp.path(),
        &[Item::File("bin", b"not a directory")],
        CompressionMethod::Stored,
    );
    let target = tmp.path().join("app");
    fs::create_dir_all(target.join("bin")).unwrap();
    fs::write(target.join("bin").join("precious"), "keep me").unwrap();

    let err = apply_archive(&archive, &Options::default().with_target_path(&target)).unwrap_err();

    assert!(matches!(err, ApplyError::Visit { ref name, .. } if name == "bin"), "{err:?}");
    let mut entries: Vec<_> = fs::read_dir(&target)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["bin"]);
    assert_eq!(
        fs::read_to_string(target.join("bin").join("precious")).unwrap(),
        "keep me"
    );
}

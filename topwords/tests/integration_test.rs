use anyhow::Result;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use tempfile::tempdir;
use topwords::tokenizer::Tokens;
use topwords::{scan, ScanConfig, ScanError, WordCount};

fn config(root: &Path, threads: usize) -> ScanConfig {
    ScanConfig::new(root).with_thread_count(NonZeroUsize::new(threads).unwrap())
}

fn create_test_files(root: &Path, files: &[(&str, &str)]) -> Result<()> {
    for (name, content) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }
    Ok(())
}

fn create_corpus(root: &Path) -> Result<()> {
    let vocabulary = [
        "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed",
        "do", "eiusmod", "tempor",
    ];
    for d in 0..6 {
        for f in 0..5 {
            let mut text = String::new();
            for i in 0..(40 + d * 7 + f * 3) {
                let word = vocabulary[(i * (d + 1) + f) % vocabulary.len()];
                let word = if i % 5 == 0 {
                    word.to_uppercase()
                } else {
                    word.to_string()
                };
                text.push_str(&word);
                text.push_str(if i % 3 == 0 { ", " } else { " " });
            }
            let dir = root.join(format!("part{}/sub{}", d, d % 2));
            fs::create_dir_all(&dir)?;
            fs::write(dir.join(format!("f{}.txt", f)), text)?;
        }
    }
    Ok(())
}

#[test]
fn test_end_to_end_scenario() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(dir.path(), &[("a.txt", "foo bar foo"), ("b/c.txt", "bar bar baz")])?;

    let report = scan(&config(dir.path(), 4).with_top(3))?;
    assert_eq!(
        report.top,
        vec![
            WordCount::new("bar", 3),
            WordCount::new("foo", 2),
            WordCount::new("baz", 1),
        ]
    );
    assert_eq!(report.render_plain(), "bar 3\nfoo 2\nbaz 1\n");
    assert_eq!(report.total_words, 6);
    assert_eq!(report.distinct_words, 3);
    assert!(report.errors.is_empty());
    Ok(())
}

#[test]
fn test_tie_break_is_by_word() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        dir.path(),
        &[
            ("one.txt", "b b b b b c c"),
            ("two/two.txt", "a a a a a c c"),
            ("three/x/three.txt", "d d d d d d d d d d"),
        ],
    )?;

    for threads in [1, 2, 8] {
        let report = scan(&config(dir.path(), threads).with_top(2))?;
        assert_eq!(
            report.top,
            vec![WordCount::new("d", 10), WordCount::new("a", 5)]
        );
    }
    Ok(())
}

#[test]
fn test_single_and_many_workers_agree() -> Result<()> {
    let dir = tempdir()?;
    create_corpus(dir.path())?;

    let single = scan(&config(dir.path(), 1).with_top(usize::MAX))?;
    let many = scan(&config(dir.path(), 8).with_top(usize::MAX))?;

    assert_eq!(single.top, many.top);
    assert_eq!(single.total_words, many.total_words);
    assert_eq!(single.distinct_words, 12);
    assert_eq!(single.stats.files_scanned, 30);
    Ok(())
}

#[test]
fn test_reported_counts_sum_to_tokens() -> Result<()> {
    let dir = tempdir()?;
    create_corpus(dir.path())?;
    create_test_files(dir.path(), &[("extra/odd.txt", "Été été ÉTÉ; x_y-z.w!")])?;

    let mut expected = 0u64;
    for entry in walk_files(dir.path())? {
        expected += Tokens::new(&fs::read(entry)?).count() as u64;
    }

    let report = scan(&config(dir.path(), 4).with_top(usize::MAX))?;
    let reported: u64 = report.top.iter().map(|w| w.count).sum();
    assert_eq!(reported, expected);
    assert_eq!(report.total_words, expected);
    assert_eq!(report.stats.tokens, expected);
    assert_eq!(report.top.len(), report.distinct_words);
    Ok(())
}

fn walk_files(root: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            files.extend(walk_files(&path)?);
        } else if path.extension().is_some_and(|e| e == "txt") {
            files.push(path);
        }
    }
    Ok(files)
}

#[test]
fn test_normalization_merges_case() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(dir.path(), &[("t.txt", "The THE the")])?;

    let report = scan(&config(dir.path(), 2))?;
    assert_eq!(report.top, vec![WordCount::new("the", 3)]);
    Ok(())
}

#[test]
fn test_distinct_words_each_once() -> Result<()> {
    let dir = tempdir()?;
    let words: Vec<String> = (0..25).map(|i| format!("word{}", i)).collect();
    let text = words.join(" ");
    create_test_files(dir.path(), &[("w.txt", text.as_str())])?;

    let report = scan(&config(dir.path(), 2).with_top(100))?;
    assert_eq!(report.distinct_words, 25);
    assert!(report.top.iter().all(|w| w.count == 1));
    // Default cut-off
    assert_eq!(scan(&config(dir.path(), 2))?.top.len(), 10);
    Ok(())
}

#[test]
fn test_empty_files_and_empty_tree() -> Result<()> {
    let dir = tempdir()?;
    let report = scan(&config(dir.path(), 2))?;
    assert!(report.top.is_empty());
    assert_eq!(report.render_plain(), "");

    create_test_files(dir.path(), &[("empty.txt", ""), ("nested/blank.txt", " \n\t ,.")])?;
    let report = scan(&config(dir.path(), 2))?;
    assert!(report.top.is_empty());
    assert_eq!(report.stats.files_scanned, 2);
    assert!(report.errors.is_empty());
    Ok(())
}

#[test]
fn test_only_txt_files_are_scanned() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        dir.path(),
        &[
            ("keep.txt", "kept"),
            ("skip.md", "skipped"),
            ("skip.TXT", "skipped"),
            ("skip.txt.orig", "skipped"),
            ("dir.txt/inner.txt", "inner"),
        ],
    )?;

    let report = scan(&config(dir.path(), 2))?;
    let words: Vec<&str> = report.top.iter().map(|w| w.word.as_str()).collect();
    assert_eq!(words, vec!["inner", "kept"]);
    Ok(())
}

#[test]
fn test_small_buffer_keeps_words_whole() -> Result<()> {
    let dir = tempdir()?;
    let long = "x".repeat(1000);
    let text = format!("{} short {} short", long, long);
    create_test_files(dir.path(), &[("long.txt", text.as_str())])?;

    let report = scan(&config(dir.path(), 1).with_buffer_capacity(7))?;
    assert_eq!(
        report.top,
        vec![WordCount::new("short", 2), WordCount::new(long, 2)]
    );
    Ok(())
}

#[test]
fn test_invalid_root_is_fatal() -> Result<()> {
    let dir = tempdir()?;
    let err = scan(&config(&dir.path().join("nope"), 1)).unwrap_err();
    assert!(matches!(err, ScanError::InvalidRoot { .. }));
    assert!(err.is_fatal());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_unreadable_subtree_is_skipped() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir()?;
    create_test_files(
        dir.path(),
        &[("ok.txt", "visible visible"), ("locked/hidden.txt", "hidden")],
    )?;
    let locked = dir.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

    // Permission bits do not stop a privileged user
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
        return Ok(());
    }

    let report = scan(&config(dir.path(), 2));
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
    let report = report?;

    assert_eq!(report.top, vec![WordCount::new("visible", 2)]);
    assert_eq!(report.stats.directories_failed, 1);
    assert!(matches!(report.errors[0], ScanError::DirectoryAccess { .. }));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir()?;
    create_test_files(
        dir.path(),
        &[("ok.txt", "visible visible"), ("sub/locked.txt", "hidden visible")],
    )?;
    let locked = dir.path().join("sub/locked.txt");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

    // Permission bits do not stop a privileged user
    if fs::File::open(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644))?;
        return Ok(());
    }

    let report = scan(&config(dir.path(), 2));
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644))?;
    let report = report?;

    assert_eq!(report.top, vec![WordCount::new("visible", 2)]);
    assert_eq!(report.total_words, 2);
    assert_eq!(report.stats.files_scanned, 1);
    assert_eq!(report.stats.files_failed, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(report.errors[0], ScanError::FileAccess { .. }));
    assert_eq!(report.errors[0].path(), Some(locked.as_path()));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_ignored() -> Result<()> {
    let dir = tempdir()?;
    let outside = tempdir()?;
    create_test_files(dir.path(), &[("real.txt", "real")])?;
    create_test_files(outside.path(), &[("far.txt", "far")])?;
    std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("alias.txt"))?;
    std::os::unix::fs::symlink(outside.path(), dir.path().join("linked_dir"))?;

    let report = scan(&config(dir.path(), 2))?;
    assert_eq!(report.top, vec![WordCount::new("real", 1)]);
    Ok(())
}

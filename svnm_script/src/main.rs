//! CLI entry point for svnm_script.
//! Usage: cargo run -p svnm_script -- compile data/states --out narrative.ron

use std::path::PathBuf;
use std::{env, fs, process};

use ron::ser::PrettyConfig;
use svnm_data::{Svnm, lint_svnm};
use svnm_script::{parse_svnm, script_files};

const USAGE: &str = "Usage:\n  svnm_script compile <file.svnm|dir>... [--out <out.ron>]\n  svnm_script lint <file.svnm|dir>...";

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    // accept both `svnm_script <cmd>` and `cargo run -- <cmd>` forms
    let args = match args.as_slice() {
        [flag, rest @ ..] if flag == "--" => rest,
        all => all,
    };
    match args {
        [cmd, rest @ ..] if cmd == "compile" => run_compile(rest),
        [cmd, rest @ ..] if cmd == "lint" => run_lint(rest),
        [cmd, ..] => {
            eprintln!("unknown command: {cmd}\n{USAGE}");
            process::exit(2);
        },
        [] => {
            eprintln!("{USAGE}");
            process::exit(2);
        },
    }
}

fn run_compile(args: &[String]) {
    let mut paths = Vec::new();
    let mut out_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--out" {
            let Some(out) = args.get(i + 1) else {
                eprintln!("--out requires a filepath");
                process::exit(2);
            };
            out_path = Some(out.clone());
            i += 2;
            continue;
        }
        paths.push(PathBuf::from(&args[i]));
        i += 1;
    }
    if paths.is_empty() {
        eprintln!("Usage: svnm_script compile <file.svnm|dir>... [--out <out.ron>]");
        process::exit(2);
    }

    let svnm = load_sources(&paths);
    let ron = ron::ser::to_string_pretty(&svnm, PrettyConfig::default()).unwrap_or_else(|e| {
        eprintln!("compile error: {e}");
        process::exit(1);
    });
    if let Some(out) = out_path {
        fs::write(&out, ron).unwrap_or_else(|e| {
            eprintln!("error: writing '{out}': {e}");
            process::exit(1);
        });
        eprintln!("compiled {} state(s) to '{out}'", svnm.len());
    } else {
        println!("{ron}");
    }
}

fn run_lint(args: &[String]) {
    if args.is_empty() {
        eprintln!("Usage: svnm_script lint <file.svnm|dir>...");
        process::exit(2);
    }
    let paths: Vec<PathBuf> = args.iter().map(PathBuf::from).collect();
    let svnm = load_sources(&paths);
    match lint_svnm(&svnm) {
        Ok(()) => println!("lint: {} state(s), no problems found", svnm.len()),
        Err(report) => {
            for entry in &report.entries {
                eprintln!("{entry}");
            }
            eprintln!("lint: {} problem(s) found", report.entries.len());
            process::exit(1);
        },
    }
}

/// Parse every given file (directories are searched for `.svnm` files) and merge the results.
fn load_sources(paths: &[PathBuf]) -> Svnm {
    let mut files = Vec::new();
    for path in paths {
        let found = script_files(path).unwrap_or_else(|e| {
            eprintln!("error: reading '{}': {e}", path.display());
            process::exit(1);
        });
        files.extend(found);
    }

    let mut svnm = Svnm::new();
    for file in &files {
        let src = fs::read_to_string(file).unwrap_or_else(|e| {
            eprintln!("error: unable to read '{}': {e}", file.display());
            process::exit(1);
        });
        let parsed = parse_svnm(&src).unwrap_or_else(|e| {
            eprintln!("{}: {e}", file.display());
            process::exit(1);
        });
        svnm.merge(parsed).unwrap_or_else(|e| {
            eprintln!("{}: {e}", file.display());
            process::exit(1);
        });
    }
    svnm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_from_files_and_directories_are_merged() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("part");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("a.svnm"), "# A
a.

b.").unwrap();
        let single = dir.path().join("single.svnm");
        fs::write(&single, "# S
s.").unwrap();

        let svnm = load_sources(&[nested, single]);
        let ids: Vec<_> = svnm.states().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["A", "A__seq1", "S"]);
    }
}

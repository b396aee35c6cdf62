use std::fs;
use std::path::{Path, PathBuf};

/// Materialize a grammar directory: a structures file plus one terminal file
/// per nonterminal representation.
pub fn write_grammar(root: &Path, structures: &str, terminals: &[(&str, &str)]) -> PathBuf {
    let grammar_dir = root.join("grammar");
    let terminals_dir = grammar_dir.join("terminals");
    fs::create_dir_all(&terminals_dir).expect("fixture directories are writable");
    fs::write(grammar_dir.join("structures.txt"), structures).expect("fixture files are writable");
    for (repr, body) in terminals {
        let file = format!("{}.txt", repr.replace('U', "L"));
        fs::write(terminals_dir.join(file), body).expect("fixture files are writable");
    }
    grammar_dir
}

pub fn write_table(root: &Path, contents: &str) -> PathBuf {
    let path = root.join("table.txt");
    fs::write(&path, contents).expect("fixture files are writable");
    path
}

pub fn write_input(root: &Path, name: &str, lines: &[Vec<u8>]) -> PathBuf {
    let path = root.join(name);
    let mut contents = Vec::new();
    for line in lines {
        contents.extend_from_slice(line);
        contents.push(b'\n');
    }
    fs::write(&path, contents).expect("fixture files are writable");
    path
}

/// The grammar of the two-structure tie scenario: `LLL` and `DDD`, one
/// group each, equal structure probabilities.
pub fn tie_grammar(root: &Path) -> (PathBuf, PathBuf) {
    let grammar = write_grammar(
        root,
        "LLL\t0x1.0p-1\t\nDDD\t0x1.0p-1\t\n",
        &[
            ("LLL", "cat\t0x1.0p+0\t\ndog\t0x1.0p+0\t\n"),
            ("DDD", "123\t0x1.0p+0\t\n"),
        ],
    );
    let table = write_table(root, "0x1.0p-1\t2\n0x1.0p-1\t3\nTotal count\t3\n");
    (grammar, table)
}

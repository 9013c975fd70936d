//! Export git metadata for `BuildInfo`. Builds outside a git checkout simply
//! leave the variables unset.

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let commit = git(&["rev-parse", "HEAD"]);
    let branch = git(&["rev-parse", "--abbrev-ref", "HEAD"]);
    let descriptor = git(&["describe", "--dirty=-modified", "--always"]);

    if let (Some(commit), Some(branch), Some(descriptor)) = (commit, branch, descriptor) {
        println!("cargo:rustc-env=ATOMICA_GIT_COMMIT={commit}");
        println!("cargo:rustc-env=ATOMICA_GIT_BRANCH={branch}");
        println!("cargo:rustc-env=ATOMICA_GIT_DESCRIPTOR={descriptor}");
    }
}

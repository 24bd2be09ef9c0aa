use chrono::prelude::*;
use std::env::{
    self,
    consts::{ARCH, OS},
};
use std::fs;
use std::ops::Add;
use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(debug_assertions)]
const BUILD_TYPE: &'static str = "debug";
#[cfg(not(debug_assertions))]
const BUILD_TYPE: &'static str = "release";

static PROTO_ROOT: &str = "proto";
static RATING_PROTO: &str = "proto/rating.proto";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    create_version_file();
    compile_protos()?;
    println!("cargo:rerun-if-changed=migrations");
    Ok(())
}

fn compile_protos() -> Result<(), Box<dyn std::error::Error>> {
    let protoc_path: PathBuf = protoc_bin_vendored::protoc_bin_path()?;
    env::set_var("PROTOC", protoc_path);
    println!("cargo:rerun-if-changed={}", RATING_PROTO);

    tonic_prost_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_protos(&[RATING_PROTO], &[PROTO_ROOT])?;
    Ok(())
}

fn create_version_file() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let version_path = Path::new(&out_dir).join("version");
    let mut result: Vec<String> = Vec::new();

    if let Some(ver) = option_env!("CARGO_PKG_VERSION") {
        result.push("v".to_string().add(ver));
    }

    if let Some(b_name) = get_branch_name().or(option_env!("CUSTOM_BRANCH").map(|i| i.to_string()))
    {
        result.push("branch:".to_string().add(b_name.as_str()));
    }

    if let Some(hash) =
        get_commit_hash().or(option_env!("CUSTOM_COMMIT_HASH").map(|i| i.to_string()))
    {
        result.push("hash:".to_string().add(hash.as_str()));
    }

    if is_working_tree_clean() {
        result.push("[clean]".to_string());
    }

    result.push("build:".to_string().add(BUILD_TYPE));
    result.push("os:".to_string().add(OS));
    result.push("arch:".to_string().add(ARCH));
    result.push("at ".to_string().add(Local::now().to_string().as_str()));

    fs::write(version_path, result.join(" ")).unwrap();
}

fn get_commit_hash() -> Option<String> {
    git_output(&["log", "-1", "--pretty=format:%h"])
}

fn get_branch_name() -> Option<String> {
    git_output(&["rev-parse", "--abbrev-ref", "HEAD"]).map(|name| name.trim_end().to_string())
}

fn git_output(args: &[&str]) -> Option<String> {
    Command::new("git").args(args).output().ok().and_then(|output| {
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).to_string())
    })
}

fn is_working_tree_clean() -> bool {
    Command::new("git")
        .arg("diff")
        .arg("--quiet")
        .arg("--exit-code")
        .status()
        .ok()
        .and_then(|status| status.code())
        .map(|code| code == 0)
        .unwrap_or(false)
}

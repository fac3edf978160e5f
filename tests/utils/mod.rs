#![allow(dead_code)]

use std::{fs, process::Command};

use servidl::{
    WireType,
    metadata::{MethodMetadata, ParameterMetadata, ServiceMetadata},
};
use tempfile::NamedTempFile;

pub trait CommandExt {
    fn run_and_check(&mut self) -> String;
    fn run_and_fail(&mut self) -> (i32, String);
}

impl CommandExt for Command {
    fn run_and_check(&mut self) -> String {
        let output = self.output().unwrap();

        assert!(
            output.status.success(),
            "Error running {}:\n{}",
            self.get_program().to_string_lossy(),
            String::from_utf8_lossy(if output.stderr.is_empty() {
                &output.stdout
            } else {
                &output.stderr
            })
        );

        String::from_utf8(output.stdout).unwrap()
    }

    /// Runs the command expecting failure, returning the exit code and stderr.
    fn run_and_fail(&mut self) -> (i32, String) {
        let output = self.output().unwrap();

        assert!(
            !output.status.success(),
            "{} unexpectedly succeeded:\n{}",
            self.get_program().to_string_lossy(),
            String::from_utf8_lossy(&output.stdout)
        );

        (
            output.status.code().unwrap(),
            String::from_utf8(output.stderr).unwrap(),
        )
    }
}

pub fn servidl() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_servidl"));
    command.env("NO_COLOR", "1").env_remove("RUST_LOG");
    command
}

pub fn description_file(src: &str) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), src).unwrap();
    file
}

pub fn method(
    name: &str,
    return_type: WireType,
    parameters: &[(i16, &str, WireType)],
) -> MethodMetadata {
    let parameters = parameters
        .iter()
        .map(|(id, name, r#type)| ParameterMetadata::new(*id, *name, r#type.clone()))
        .collect();

    MethodMetadata::new(name, return_type, parameters).unwrap()
}

pub fn service(name: &str, methods: impl IntoIterator<Item = MethodMetadata>) -> ServiceMetadata {
    ServiceMetadata::new(name, methods).unwrap()
}

pub fn echo_service() -> ServiceMetadata {
    service(
        "EchoService",
        [method(
            "echo",
            WireType::STRING,
            &[(1, "message", WireType::STRING)],
        )],
    )
}

use serde::Serialize;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct VersionOutput {
    schema_id: &'static str,
    name: &'static str,
    version: &'static str,
    target: &'static str,
    rustc: &'static str,
    git_hash: &'static str,
}

pub fn run(args: VersionArgs, format: OutputFormat) -> CliResult<i32> {
    let out = VersionOutput {
        schema_id: "https://schemas.3leaps.dev/zwire/cli/v1/version.schema.json",
        name: "zwire",
        version: env!("CARGO_PKG_VERSION"),
        target: option_env!("ZWIRE_BUILD_TARGET").unwrap_or("unknown"),
        rustc: option_env!("RUSTC_VERSION").unwrap_or("unknown"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
    };

    if let OutputFormat::Json = format {
        println!(
            "{}",
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        );
        return Ok(SUCCESS);
    }

    if !args.extended {
        println!("zwire {}", out.version);
        return Ok(SUCCESS);
    }

    println!("name: {}", out.name);
    println!("version: {}", out.version);
    println!("target: {}", out.target);
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("rustc: {}", out.rustc);
    println!("git_hash: {}", out.git_hash);
    println!(
        "features: async={}, cli=true",
        cfg!(feature = "async")
    );

    Ok(SUCCESS)
}

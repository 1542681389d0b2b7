use std::net::SocketAddr;
use std::path::PathBuf;

use enhance_backend_core::api::server::serve;
use enhance_backend_core::config::ServiceConfig;
use enhance_backend_core::default_app_root;
use enhance_backend_core::style::{apply_style, style_description, DEFAULT_STYLE, STYLE_PRESETS};
use serde_json::json;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli_args = std::env::args().skip(1).collect::<Vec<_>>();
    match cli_args.first().map(String::as_str) {
        Some("list-styles") => {
            run_list_styles_cli()?;
            return Ok(());
        }
        Some("apply-style") => {
            run_apply_style_cli(cli_args.into_iter().skip(1).collect::<Vec<_>>())?;
            return Ok(());
        }
        Some("-h") | Some("--help") => {
            print_usage();
            return Ok(());
        }
        Some("serve") | None => {}
        Some(unknown) => {
            return Err(std::io::Error::other(format!(
                "Unknown command: {unknown}\n\nUse --help for usage."
            ))
            .into());
        }
    }

    let config = ServiceConfig::load(default_app_root().as_path())?;
    let addr: SocketAddr = config.bind.parse()?;
    serve(addr, config).await
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}

fn run_list_styles_cli() -> Result<(), Box<dyn std::error::Error>> {
    let styles = STYLE_PRESETS
        .iter()
        .map(|preset| {
            json!({
                "id": preset.name,
                "description": style_description(preset.name),
                "settings": preset.config,
            })
        })
        .collect::<Vec<_>>();
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "ok": true, "styles": styles }))?
    );
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
struct ApplyStyleCliArgs {
    input: PathBuf,
    output: PathBuf,
    style: String,
    intensity: f32,
}

fn parse_apply_style_cli_args(
    args: &[String],
) -> Result<ApplyStyleCliArgs, Box<dyn std::error::Error>> {
    let mut input = None::<PathBuf>;
    let mut output = None::<PathBuf>;
    let mut style = String::from(DEFAULT_STYLE);
    let mut intensity = 0.8f32;

    let mut i = 0usize;
    while i < args.len() {
        let flag = args[i].as_str();
        let needs_value = |idx: usize| -> Result<String, Box<dyn std::error::Error>> {
            let Some(value) = args.get(idx + 1) else {
                return Err(std::io::Error::other(format!("Missing value for {flag}")).into());
            };
            Ok(value.clone())
        };

        match flag {
            "--input" => {
                input = Some(PathBuf::from(needs_value(i)?));
                i += 2;
            }
            "--output" => {
                output = Some(PathBuf::from(needs_value(i)?));
                i += 2;
            }
            "--style" => {
                style = needs_value(i)?;
                i += 2;
            }
            "--intensity" => {
                let raw = needs_value(i)?;
                intensity = raw.trim().parse::<f32>().map_err(|_| {
                    std::io::Error::other(format!("Invalid --intensity value: {raw}"))
                })?;
                i += 2;
            }
            unknown => {
                return Err(std::io::Error::other(format!(
                    "Unknown argument: {unknown}\n\nUse --help for usage."
                ))
                .into());
            }
        }
    }

    if !(0.0..=1.0).contains(&intensity) {
        return Err(std::io::Error::other("--intensity must be between 0 and 1").into());
    }
    let input = input.ok_or_else(|| std::io::Error::other("Missing required --input"))?;
    let output = output.ok_or_else(|| std::io::Error::other("Missing required --output"))?;
    Ok(ApplyStyleCliArgs {
        input,
        output,
        style,
        intensity,
    })
}

fn run_apply_style_cli(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print_apply_style_usage();
        return Ok(());
    }
    let parsed = parse_apply_style_cli_args(args.as_slice())?;
    let image = image::open(parsed.input.as_path())?;
    let styled = apply_style(&image, parsed.style.as_str(), parsed.intensity);
    styled.save(parsed.output.as_path())?;
    info!(
        input = %parsed.input.display(),
        output = %parsed.output.display(),
        style = %parsed.style,
        intensity = parsed.intensity,
        "style applied"
    );
    Ok(())
}

fn print_usage() {
    eprintln!(concat!(
        "Usage:\n",
        "  enhance-backend-core [serve]\n",
        "  enhance-backend-core list-styles\n",
        "  enhance-backend-core apply-style --input PATH --output PATH [--style NAME] [--intensity F]\n\n",
        "Environment:\n",
        "  ENHANCE_BACKEND_BIND (default 127.0.0.1:8000), OPENAI_API_KEY, REPLICATE_API_TOKEN\n",
        "  ENHANCE_SETTINGS_PATH (default config/enhance.settings.toml under the app root)\n"
    ));
}

fn print_apply_style_usage() {
    eprintln!(
        concat!(
            "Usage:\n",
            "  cargo run -- apply-style --input PATH --output PATH [--style NAME] [--intensity F]\n\n",
            "Defaults:\n",
            "  --style cinematic (unknown names fall back to cinematic)\n",
            "  --intensity 0.8\n"
        )
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn apply_style_requires_input_and_output() {
        let err = parse_apply_style_cli_args(&args(&["--output", "out.png"]))
            .expect_err("input should be required");
        assert!(err.to_string().contains("--input"));
        let err = parse_apply_style_cli_args(&args(&["--input", "in.png"]))
            .expect_err("output should be required");
        assert!(err.to_string().contains("--output"));
    }

    #[test]
    fn apply_style_defaults_style_and_intensity() {
        let parsed = parse_apply_style_cli_args(&args(&["--input", "a.png", "--output", "b.png"]))
            .expect("parse should succeed");
        assert_eq!(parsed.style, "cinematic");
        assert_eq!(parsed.intensity, 0.8);
    }

    #[test]
    fn apply_style_accepts_all_flags() {
        let parsed = parse_apply_style_cli_args(&args(&[
            "--input",
            "a.png",
            "--output",
            "b.jpg",
            "--style",
            "moody",
            "--intensity",
            "0.5",
        ]))
        .expect("parse should succeed");
        assert_eq!(parsed.input, PathBuf::from("a.png"));
        assert_eq!(parsed.output, PathBuf::from("b.jpg"));
        assert_eq!(parsed.style, "moody");
        assert_eq!(parsed.intensity, 0.5);
    }

    #[test]
    fn apply_style_rejects_bad_values() {
        assert!(parse_apply_style_cli_args(&args(&["--input"])).is_err());
        assert!(parse_apply_style_cli_args(&args(&[
            "--input", "a", "--output", "b", "--intensity", "lots"
        ]))
        .is_err());
        assert!(parse_apply_style_cli_args(&args(&[
            "--input", "a", "--output", "b", "--intensity", "1.5"
        ]))
        .is_err());
        assert!(parse_apply_style_cli_args(&args(&["--bogus"])).is_err());
    }
}

//! Entry point for Tintbox: logging, CLI flags, then the viewer loop.

use std::path::PathBuf;

use anyhow::Result;
use corelib::scene::{EnvironmentPreset, ModelSettings};
use platform::ViewerConfig;

const DEFAULT_MODEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/black-box.glb");

fn parse_backend_arg(args: &[String]) -> wgpu::Backends {
    // Accept: --gpu-backend=auto|vulkan|dx12|metal|gl
    let mut backends = wgpu::Backends::all();
    for arg in args {
        if let Some(val) = arg.strip_prefix("--gpu-backend=") {
            backends = match val.to_ascii_lowercase().as_str() {
                "auto" => wgpu::Backends::all(),
                "vulkan" | "vk" => wgpu::Backends::VULKAN,
                "dx12" | "d3d12" => wgpu::Backends::DX12,
                "metal" | "mtl" => wgpu::Backends::METAL,
                "gl" | "opengl" | "gles" => wgpu::Backends::GL,
                other => {
                    log::warn!("Unknown backend '{other}', falling back to auto.");
                    wgpu::Backends::all()
                }
            };
        }
    }
    backends
}

fn parse_show_fps_arg(args: &[String]) -> bool {
    // --show-fps[=on|off], off by default
    for arg in args {
        if arg == "--show-fps" {
            return true;
        }
        if let Some(val) = arg.strip_prefix("--show-fps=") {
            return matches!(
                val.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            );
        }
    }
    false
}

fn parse_size_args(args: &[String], default: (u32, u32)) -> (u32, u32) {
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;

    for arg in args {
        if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    w = Some(pw);
                    h = Some(ph);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            if let Ok(pw) = v.parse::<u32>() {
                w = Some(pw);
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            if let Ok(ph) = v.parse::<u32>() {
                h = Some(ph);
            }
        }
    }

    (w.unwrap_or(default.0).max(1), h.unwrap_or(default.1).max(1))
}

fn parse_model_arg(args: &[String]) -> PathBuf {
    args.iter()
        .rev()
        .find_map(|arg| arg.strip_prefix("--model="))
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_MODEL), PathBuf::from)
}

fn parse_environment_arg(args: &[String]) -> EnvironmentPreset {
    let mut preset = EnvironmentPreset::default();
    for arg in args {
        if let Some(val) = arg.strip_prefix("--environment=") {
            preset = val.parse().unwrap_or_else(|err| {
                log::warn!("{err}; using '{}'.", EnvironmentPreset::default());
                EnvironmentPreset::default()
            });
        }
    }
    preset
}

fn parse_config(args: &[String]) -> ViewerConfig {
    let defaults = ViewerConfig::default();
    let (width, height) = parse_size_args(args, (defaults.width, defaults.height));
    ViewerConfig {
        backends: parse_backend_arg(args),
        show_fps: parse_show_fps_arg(args),
        width,
        height,
        model: ModelSettings {
            path: parse_model_arg(args),
            ..defaults.model
        },
        environment: parse_environment_arg(args),
        controls: defaults.controls,
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = parse_config(&args);
    log::info!(
        "Starting Tintbox. Backend: {:?}, show_fps={}, window_size={}x{}, environment={}, model={}",
        config.backends,
        config.show_fps,
        config.width,
        config.height,
        config.environment,
        config.model.path.display()
    );

    platform::run(config)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_flags() {
        let cfg = parse_config(&[]);
        assert_eq!(cfg.backends, wgpu::Backends::all());
        assert!(!cfg.show_fps);
        assert_eq!((cfg.width, cfg.height), (400, 560));
        assert_eq!(cfg.environment, EnvironmentPreset::City);
        assert!(cfg.model.path.ends_with("black-box.glb"));
        assert_eq!(cfg.model.mesh_node, "Cube");
        assert_eq!(cfg.model.material, "Material.001");
    }

    #[test]
    fn backend_names() {
        assert_eq!(parse_backend_arg(&args(&["--gpu-backend=VK"])), wgpu::Backends::VULKAN);
        assert_eq!(parse_backend_arg(&args(&["--gpu-backend=gles"])), wgpu::Backends::GL);
        assert_eq!(parse_backend_arg(&args(&["--gpu-backend=nope"])), wgpu::Backends::all());
    }

    #[test]
    fn show_fps_forms() {
        assert!(parse_show_fps_arg(&args(&["--show-fps"])));
        assert!(parse_show_fps_arg(&args(&["--show-fps=on"])));
        assert!(!parse_show_fps_arg(&args(&["--show-fps=off"])));
    }

    #[test]
    fn size_flags_and_overrides() {
        assert_eq!(parse_size_args(&args(&["--size=800X600"]), (1, 1)), (800, 600));
        assert_eq!(parse_size_args(&args(&["--size=800x600", "--height=300"]), (1, 1)), (800, 300));
        assert_eq!(parse_size_args(&args(&["--width=0"]), (400, 560)), (1, 560));
        assert_eq!(parse_size_args(&args(&["--size=wide"]), (400, 560)), (400, 560));
    }

    #[test]
    fn model_and_environment() {
        let cfg = parse_config(&args(&["--model=/tmp/other.glb", "--environment=Sunset"]));
        assert_eq!(cfg.model.path, PathBuf::from("/tmp/other.glb"));
        assert_eq!(cfg.environment, EnvironmentPreset::Sunset);
        assert_eq!(parse_environment_arg(&args(&["--environment=moon"])), EnvironmentPreset::City);
    }
}

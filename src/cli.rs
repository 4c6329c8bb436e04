// CLI surface - build, watch, serve, prompt, transpile

use crate::{
    build::{BuildContext, Builder},
    config::{BuildConfig, ServeConfig, WatchConfig},
    manifest::PackageMetadata,
    prompt, serve, watch,
};
use anyhow::Result;
use clap::{CommandFactory, Parser};
use console::style;
use std::sync::Arc;

/// Compile a single-file Windy plugin into dist/plugin.js
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "windy-plugin-compiler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Build the plugin in required directory (default src)
    #[arg(short, long)]
    pub build: bool,

    /// Build plugin and watch file changes in required directory
    #[arg(short, long)]
    pub watch: bool,

    /// Serve dist directory on port 9999
    #[arg(short, long)]
    pub serve: bool,

    /// Show command line prompt with all the examples
    #[arg(short, long)]
    pub prompt: bool,

    /// Transpile your code down to ES2015 with esbuild
    #[arg(short, long)]
    pub transpile: bool,
}

impl Cli {
    /// Whether any flag was given
    pub fn has_task(&self) -> bool {
        self.build || self.watch || self.serve || self.prompt || self.transpile
    }

    /// Write the help text shown when no flag is given
    pub fn write_help(out: &mut impl std::io::Write) -> std::io::Result<()> {
        let mut command = Self::command();
        command.write_help(out)
    }

    /// Build configuration for a project rooted at `root`
    pub fn build_config(&self, root: impl Into<std::path::PathBuf>) -> BuildConfig {
        BuildConfig {
            transpile: self.transpile,
            ..BuildConfig::with_root(root)
        }
    }

    /// Execute the requested tasks in the current directory
    pub async fn run(self) -> Result<()> {
        let mut config = self.build_config(std::env::current_dir()?);

        let package = PackageMetadata::from_file(&config.package_json())?;
        println!(
            "\nBuilding {}, version {}",
            style(&package.name).yellow(),
            style(&package.version).yellow()
        );

        if self.prompt {
            config.src_dir = prompt::select_source_dir(&config.root)?;
        }

        println!(
            "Compiler will compile {}",
            style(format!("./{}/plugin.html", config.src_dir.display())).yellow()
        );

        // Fail fast on a broken project before starting long-running tasks
        BuildContext::load(&config)?;

        let builder = Arc::new(Builder::new(config.clone()));

        if self.watch || self.build {
            let initial = builder.clone();
            let result = tokio::task::spawn_blocking(move || initial.build()).await?;
            match result {
                Ok(report) => println!(
                    "Your plugin {} has been compiled to {}",
                    style(&report.name).dim(),
                    style(report.destination.display()).dim()
                ),
                // Watch mode keeps going and retries on the next change
                Err(e) if self.watch => {
                    tracing::error!(error = %e, "Initial build failed");
                }
                Err(e) => return Err(e.into()),
            }
        }

        if !self.watch && !self.serve {
            return Ok(());
        }

        let server = if self.serve {
            let serve_config = ServeConfig::for_build(&config);
            println!(
                "Your plugin is published at\n    {}.\n    Use {} to test it.\n",
                style(serve_config.artifact_url(&config.output_file)).dim(),
                style("https://www.windy.com/dev").yellow()
            );
            Some(tokio::spawn(serve::serve(serve_config)))
        } else {
            None
        };

        if self.watch {
            println!(
                "Starting watch on {} and {}. Build 1 sec after change....",
                style(config.src_dir.display()).dim(),
                style("package.json").dim()
            );
        }

        let watch_task = async {
            if self.watch {
                watch::watch(builder.clone(), WatchConfig::for_build(&config)).await
            } else {
                std::future::pending::<Result<()>>().await
            }
        };

        let server_task = async {
            match server {
                Some(handle) => handle.await?,
                None => std::future::pending::<Result<()>>().await,
            }
        };

        tokio::select! {
            result = watch_task => result,
            result = server_task => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_flags_means_no_task() {
        let cli = Cli::try_parse_from(["windy-plugin-compiler"]).unwrap();
        assert!(!cli.has_task());
    }

    #[test]
    fn short_flags_combine() {
        let cli = Cli::try_parse_from(["windy-plugin-compiler", "-ws"]).unwrap();
        assert!(cli.watch);
        assert!(cli.serve);
        assert!(!cli.build);
        assert!(cli.has_task());
    }

    #[test]
    fn transpile_flag_reaches_build_config() {
        let cli = Cli::try_parse_from(["windy-plugin-compiler", "--build", "--transpile"]).unwrap();
        let config = cli.build_config("/work/plugin");
        assert!(config.transpile);
        assert_eq!(
            config.destination(),
            std::path::PathBuf::from("/work/plugin/dist/plugin.js")
        );
    }

    #[test]
    fn help_lists_every_flag() {
        let mut out = Vec::new();
        Cli::write_help(&mut out).unwrap();

        let help = String::from_utf8(out).unwrap();
        for flag in ["--build", "--watch", "--serve", "--prompt", "--transpile"] {
            assert!(help.contains(flag), "help is missing {flag}");
        }
    }

    #[test]
    fn help_write_failure_is_reported() {
        struct Closed;

        impl std::io::Write for Closed {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::BrokenPipe.into())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let err = Cli::write_help(&mut Closed).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn flags_take_no_arguments() {
        assert!(Cli::try_parse_from(["windy-plugin-compiler", "--build=src"]).is_err());
    }
}

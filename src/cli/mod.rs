//! CLI argument parsing for opsgate.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use opsgate::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;

/// opsgate: pipeline gates and declarative command synthesis for DevOps workflows.
///
/// Gates map a JSON context to a verdict literal; handlers turn compute nodes
/// into docker/podman and terraform/tofu commands and record their results
/// back into the context.
#[derive(Parser, Debug)]
#[command(name = "opsgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file holding capability settings and execution options.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for opsgate.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a gate against a context and print its verdict.
    Gate(GateArgs),

    /// List gates and their verdict sets.
    Gates,

    /// Apply an aggregate transform and print the result.
    Transform(TransformArgs),

    /// Print the commands a compute node would run.
    Plan(PlanArgs),

    /// Run a compute node through its handler.
    ///
    /// The node output is stored in the context file under the node's
    /// output key. Exits with code 3 when the node fails.
    Run(RunArgs),

    /// Check a workflow definition.
    Validate(ValidateArgs),

    /// Resolve which branch a condition node takes.
    Branch(BranchArgs),

    /// Capability settings.
    Config(ConfigCommand),
}

/// Arguments for the `gate` command.
#[derive(Parser, Debug)]
pub struct GateArgs {
    /// Gate name (e.g., deployment_ready).
    pub name: String,

    /// JSON context file; an empty context is used when omitted.
    #[arg(long)]
    pub context: Option<PathBuf>,
}

/// Arguments for the `transform` command.
#[derive(Parser, Debug)]
pub struct TransformArgs {
    /// Transform name (e.g., merge_deployment_results).
    pub name: String,

    /// JSON context file.
    #[arg(long)]
    pub context: Option<PathBuf>,

    /// Store the result in the context file under this key.
    #[arg(long, requires = "context")]
    pub output_key: Option<String>,
}

/// Arguments for the `plan` command.
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// YAML or JSON compute node.
    #[arg(long)]
    pub node: PathBuf,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// YAML or JSON compute node.
    #[arg(long)]
    pub node: PathBuf,

    /// JSON context file, created if missing.
    #[arg(long)]
    pub context: Option<PathBuf>,

    /// Record commands instead of running them; the context is not saved.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Workflow definition file.
    pub workflow: PathBuf,
}

/// Arguments for the `branch` command.
#[derive(Parser, Debug)]
pub struct BranchArgs {
    /// Workflow definition file.
    pub workflow: PathBuf,

    /// Condition node id.
    pub node: String,

    /// JSON context file.
    #[arg(long)]
    pub context: Option<PathBuf>,
}

/// Arguments for the `config` command.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show effective capability settings.
    Show(ConfigShowArgs),

    /// Store capability settings.
    Set(ConfigSetArgs),
}

/// Arguments for `config show`.
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Capability name; all capabilities when omitted.
    pub capability: Option<String>,
}

/// Arguments for `config set`.
#[derive(Parser, Debug)]
pub struct ConfigSetArgs {
    /// Capability name (e.g., container_settings).
    pub capability: String,

    /// Settings as key=value; values are parsed as JSON, falling back to text.
    #[arg(required = true)]
    pub assignments: Vec<String>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_gate() {
        let cli = Cli::try_parse_from([
            "opsgate",
            "gate",
            "deployment_ready",
            "--context",
            "ctx.json",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("opsgate.yaml"));
        assert_eq!(cli.verbose, 0);
        if let Command::Gate(args) = cli.command {
            assert_eq!(args.name, "deployment_ready");
            assert_eq!(args.context, Some(PathBuf::from("ctx.json")));
        } else {
            panic!("Expected Gate command");
        }
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["opsgate", "gates", "-vv", "--config", "ops.yaml"]).unwrap();
        assert!(matches!(cli.command, Command::Gates));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, PathBuf::from("ops.yaml"));
    }

    #[test]
    fn parse_transform_output_key_requires_context() {
        let missing_context = Cli::try_parse_from([
            "opsgate",
            "transform",
            "merge_deployment_results",
            "--output-key",
            "merged",
        ]);
        assert!(missing_context.is_err());
        let cli = Cli::try_parse_from([
            "opsgate",
            "transform",
            "merge_deployment_results",
            "--context",
            "ctx.json",
            "--output-key",
            "merged",
        ])
        .unwrap();
        if let Command::Transform(args) = cli.command {
            assert_eq!(args.output_key.as_deref(), Some("merged"));
        } else {
            panic!("Expected Transform command");
        }
    }

    #[test]
    fn parse_run() {
        let cli =
            Cli::try_parse_from(["opsgate", "run", "--node", "build.yaml", "--dry-run"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.node, PathBuf::from("build.yaml"));
            assert!(args.dry_run);
            assert!(args.context.is_none());
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_requires_node() {
        assert!(Cli::try_parse_from(["opsgate", "run"]).is_err());
    }

    #[test]
    fn parse_config_set() {
        let cli = Cli::try_parse_from([
            "opsgate",
            "config",
            "set",
            "container_settings",
            "runtime=podman",
            "max_image_size_mb=500",
        ])
        .unwrap();
        if let Command::Config(ConfigCommand {
            action: ConfigAction::Set(args),
        }) = cli.command
        {
            assert_eq!(args.capability, "container_settings");
            assert_eq!(args.assignments, vec!["runtime=podman", "max_image_size_mb=500"]);
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn parse_config_set_requires_assignment() {
        assert!(Cli::try_parse_from(["opsgate", "config", "set", "cicd_settings"]).is_err());
    }

    #[test]
    fn parse_config_show_optional_capability() {
        let cli = Cli::try_parse_from(["opsgate", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand {
                action: ConfigAction::Show(ConfigShowArgs { capability: None })
            })
        ));
    }

    #[test]
    fn parse_branch() {
        let cli = Cli::try_parse_from(["opsgate", "branch", "deploy.yaml", "readiness"]).unwrap();
        if let Command::Branch(args) = cli.command {
            assert_eq!(args.workflow, PathBuf::from("deploy.yaml"));
            assert_eq!(args.node, "readiness");
        } else {
            panic!("Expected Branch command");
        }
    }
}

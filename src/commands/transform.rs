//! Implementation of the `opsgate transform` command.

use super::{event_log, load_context};
use crate::cli::TransformArgs;
use opsgate::aggregate::lookup_transform;
use opsgate::config::Config;
use opsgate::context::ContextStore;
use opsgate::error::Result;
use opsgate::events::{Event, EventAction};
use serde_json::json;
use std::path::Path;
use tracing::info;

/// Execute the `opsgate transform` command.
///
/// Prints the aggregate as pretty JSON. With `--output-key`, the aggregate is
/// also stored in the context file under that key.
pub fn cmd_transform(config_path: &Path, args: TransformArgs) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let transform = lookup_transform(&args.name)?;
    let mut ctx = load_context(args.context.as_deref())?;

    let value = transform.apply(&ctx)?;

    if let (Some(key), Some(path)) = (&args.output_key, &args.context) {
        ctx.set(key, value.clone());
        ctx.save(path)?;
        info!("stored {} under '{}' in {}", transform, key, path.display());
    }

    event_log(&config).record(
        &Event::new(EventAction::TransformApplied).with_details(json!({
            "transform": transform.name(),
            "output_key": args.output_key,
        })),
    )?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsgate::context::WorkflowContext;
    use tempfile::TempDir;

    #[test]
    fn transform_stores_result_under_output_key() {
        let temp = TempDir::new().unwrap();
        let ctx_path = temp.path().join("ctx.json");
        std::fs::write(
            &ctx_path,
            r#"{
                "monitoring_result": {"success": true},
                "notification_result": {"success": true}
            }"#,
        )
        .unwrap();

        cmd_transform(
            &temp.path().join("opsgate.yaml"),
            TransformArgs {
                name: "merge_deployment_results".to_string(),
                context: Some(ctx_path.clone()),
                output_key: Some("merged".to_string()),
            },
        )
        .unwrap();

        let ctx = WorkflowContext::load(&ctx_path).unwrap();
        let merged = ctx.get_object("merged");
        assert_eq!(merged["all_tasks_success"], json!(true));
        assert_eq!(merged["docs_updated"], json!(false));
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn transform_without_output_key_leaves_context_untouched() {
        let temp = TempDir::new().unwrap();
        let ctx_path = temp.path().join("ctx.json");
        std::fs::write(&ctx_path, r#"{"target_env": "staging"}"#).unwrap();

        cmd_transform(
            &temp.path().join("opsgate.yaml"),
            TransformArgs {
                name: "generate_deployment_summary".to_string(),
                context: Some(ctx_path.clone()),
                output_key: None,
            },
        )
        .unwrap();

        assert_eq!(WorkflowContext::load(&ctx_path).unwrap().len(), 1);
    }
}

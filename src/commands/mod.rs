use crate::cli::Cmd;
use crate::core::context::AppCtx;
use crate::core::exchange::ImportStrategy;

pub mod add;
pub mod backups;
mod clipboard;
pub mod config;
pub mod delete;
pub mod edit;
pub mod execute;
pub mod export;
pub mod get;
pub mod import;
pub mod interactive;
pub mod list;
pub mod restore;
pub mod scan;

/// Dispatches the parsed command to the appropriate handler.
pub fn dispatch(command: Cmd, ctx: &mut AppCtx) -> Result<(), String> {
    match command {
        Cmd::Add {
            name,
            from_file,
            from_clipboard,
            tags,
            force,
        } => add::run(
            ctx,
            &name,
            from_file.as_deref(),
            from_clipboard,
            &tags,
            force,
        ),
        Cmd::Get {
            name,
            vars,
            raw,
            scan_only,
            stdout,
            file,
            append,
            preview,
            lines,
            output,
            execute,
        } => {
            let opts = get::GetOptions {
                vars,
                raw,
                scan_only,
                stdout,
                file,
                append,
                preview,
                lines,
                output,
                execute,
            };
            get::run(ctx, &name, &opts)
        }
        Cmd::List { tags, json } => list::run(ctx, &tags, json),
        Cmd::Edit { name, editor } => edit::run(ctx, &name, editor.as_deref()),
        Cmd::Delete { name } => delete::run(ctx, &name),
        Cmd::Export {
            output,
            format,
            prompts,
            raw,
            force,
        } => export::run(ctx, output.as_deref(), format, &prompts, raw, force),
        Cmd::Import {
            file,
            merge,
            overwrite,
        } => {
            let strategy = if overwrite {
                ImportStrategy::Overwrite
            } else if merge {
                ImportStrategy::Merge
            } else {
                ImportStrategy::Skip
            };
            import::run(ctx, &file, strategy)
        }
        Cmd::Scan { name, json } => scan::run(ctx, &name, json),
        Cmd::Backups => backups::run(ctx),
        Cmd::Restore { backup } => restore::run(ctx, &backup),
        Cmd::Config { key, value } => config::run(ctx, key.as_deref(), value.as_deref()),
        Cmd::Interactive => interactive::run(ctx),
    }
}

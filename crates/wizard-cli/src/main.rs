mod shell;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use shell::{SessionOptions, run_session};
use wizard_engine::{EntryKind, JsonStorage, Template, TemplateManager, TemplateStore};
use wizard_spec::{
    FieldControl, FieldDef, SelectOption, ShowWhen, TemplateOption, check_fields,
};

pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Adaptive project setup wizard",
    long_about = "Interactive setup wizard with conditional fields, reusable content templates, and schema checks"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the wizard in an interactive text shell.
    Run {
        /// Path to a JSON field schema; defaults to the built-in project setup flow.
        #[arg(long, value_name = "SCHEMA")]
        schema: Option<PathBuf>,
        /// Directory holding template stores (defaults to the platform data dir).
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,
        /// Print the collected answers as JSON when done.
        #[arg(long)]
        answers_json: bool,
        /// Expand the chosen template with the answers and write it here.
        #[arg(long, value_name = "FILE")]
        render_out: Option<PathBuf>,
        /// Show wizard state before each prompt.
        #[arg(long, alias = "debug")]
        verbose: bool,
    },
    /// Inspect and edit a template store without running the wizard.
    Templates {
        /// Store name the templates live under.
        #[arg(long, default_value = "readme-templates")]
        store: String,
        /// Directory holding template stores (defaults to the platform data dir).
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,
        #[command(subcommand)]
        action: TemplatesAction,
    },
    /// Check a JSON field schema and report problems.
    Validate {
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,
    },
}

#[derive(Subcommand)]
enum TemplatesAction {
    /// List stored templates in insertion order.
    List,
    /// Add or replace a template under a label.
    Add {
        label: String,
        /// Inline template content.
        #[arg(long, value_name = "TEXT", conflicts_with = "file")]
        content: Option<String>,
        /// Read template content from a file.
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Print a stored template's content.
    Show { label: String },
    /// Remove a template by label.
    Remove { label: String },
    /// Copy a template under a fresh "Copy of" label.
    Duplicate { label: String },
}

fn main() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            schema,
            data_dir,
            answers_json,
            render_out,
            verbose,
        } => {
            let fields = load_schema(schema.as_deref())?;
            let options = SessionOptions {
                verbose,
                answers_json,
                render_out,
            };
            run_session(
                "Project Setup Wizard",
                fields,
                storage_for(data_dir),
                &options,
            )
        }
        Command::Templates {
            store,
            data_dir,
            action,
        } => run_templates(&store, storage_for(data_dir), action),
        Command::Validate { schema } => run_validate(&schema),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn storage_for(data_dir: Option<PathBuf>) -> JsonStorage {
    match data_dir {
        Some(dir) => JsonStorage::new(dir),
        None => JsonStorage::in_data_dir("setup-wizard"),
    }
}

fn load_schema(path: Option<&Path>) -> CliResult<Vec<FieldDef>> {
    let fields: Vec<FieldDef> = match path {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => default_fields(),
    };
    let report = check_fields(&fields);
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    if !report.is_ok() {
        let mut message = String::from("field schema is invalid:");
        for error in &report.errors {
            message.push_str(&format!("\n  {error}"));
        }
        return Err(message.into());
    }
    Ok(fields)
}

fn run_validate(path: &Path) -> CliResult<()> {
    let fields: Vec<FieldDef> = serde_json::from_str(&fs::read_to_string(path)?)?;
    let report = check_fields(&fields);
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    if report.is_ok() {
        println!("Schema OK ({} fields)", fields.len());
        Ok(())
    } else {
        for error in &report.errors {
            println!("error: {error}");
        }
        Err("schema check failed".into())
    }
}

fn run_templates(store_name: &str, storage: JsonStorage, action: TemplatesAction) -> CliResult<()> {
    let store = TemplateStore::new(storage);
    match action {
        TemplatesAction::List => {
            let templates = store.list(store_name);
            if templates.is_empty() {
                println!("(no templates)");
            }
            for template in templates {
                println!("{}", template.label);
            }
            Ok(())
        }
        TemplatesAction::Add {
            label,
            content,
            file,
        } => {
            let content = match (content, file) {
                (Some(content), None) => content,
                (None, Some(path)) => fs::read_to_string(path)?,
                _ => return Err("provide template content with --content or --file".into()),
            };
            store.save(store_name, Template {
                label: label.clone(),
                content,
            })?;
            println!("Saved '{label}'.");
            Ok(())
        }
        TemplatesAction::Show { label } => {
            match store
                .list(store_name)
                .into_iter()
                .find(|template| template.label == label)
            {
                Some(template) => {
                    println!("{}", template.content);
                    Ok(())
                }
                None => Err(format!("no template named '{label}'").into()),
            }
        }
        TemplatesAction::Remove { label } => {
            if store.delete(store_name, &label)? {
                println!("Removed '{label}'.");
                Ok(())
            } else {
                Err(format!("no template named '{label}'").into())
            }
        }
        TemplatesAction::Duplicate { label } => {
            let mut manager = TemplateManager::new(store, store_name, Vec::new());
            let Some(position) = manager
                .entries()
                .iter()
                .position(|entry| entry.kind == EntryKind::Custom && entry.value == label)
            else {
                return Err(format!("no template named '{label}'").into());
            };
            manager.set_highlight(position);
            manager.duplicate()?;
            if let Some(copy) = manager.highlighted() {
                println!("Created '{}'.", copy.label);
            }
            Ok(())
        }
    }
}

fn option(label: &str, value: &str, description: &str) -> SelectOption {
    SelectOption {
        label: label.into(),
        value: value.into(),
        description: Some(description.into()),
        disabled: false,
    }
}

/// The stock project-setup flow used when no schema file is given.
fn default_fields() -> Vec<FieldDef> {
    vec![
        FieldDef {
            key: "name".into(),
            label: "Project name".into(),
            optional: false,
            show_when: None,
            control: FieldControl::Text {
                placeholder: Some("my-awesome-project".into()),
                default_value: None,
            },
        },
        FieldDef {
            key: "description".into(),
            label: "Description".into(),
            optional: true,
            show_when: None,
            control: FieldControl::Text {
                placeholder: Some("A short description of your project".into()),
                default_value: None,
            },
        },
        FieldDef {
            key: "framework".into(),
            label: "Framework".into(),
            optional: false,
            show_when: None,
            control: FieldControl::Select {
                options: vec![
                    option("React", "react", "A library for building user interfaces"),
                    option("Vue", "vue", "The progressive JavaScript framework"),
                    option("Svelte", "svelte", "Cybernetically enhanced web apps"),
                    option("Angular", "angular", "The modern web developer's platform"),
                ],
            },
        },
        FieldDef {
            key: "features".into(),
            label: "Features".into(),
            optional: false,
            show_when: None,
            control: FieldControl::MultiSelect {
                options: vec![
                    option("TypeScript", "typescript", "Type-safe JavaScript"),
                    option("ESLint", "eslint", "Pluggable linting utility"),
                    option("Prettier", "prettier", "Opinionated code formatter"),
                    option("Vitest", "vitest", "Blazing fast unit testing"),
                    option("Tailwind CSS", "tailwindcss", "Utility-first CSS framework"),
                    option("Docker", "docker", "Container deployment"),
                    SelectOption {
                        label: "Storybook".into(),
                        value: "storybook".into(),
                        description: Some("Component explorer".into()),
                        disabled: true,
                    },
                ],
            },
        },
        FieldDef {
            key: "ci".into(),
            label: "Set up CI?".into(),
            optional: false,
            show_when: None,
            control: FieldControl::Select {
                options: vec![
                    SelectOption {
                        label: "Yes".into(),
                        value: "yes".into(),
                        description: None,
                        disabled: false,
                    },
                    SelectOption {
                        label: "No".into(),
                        value: "no".into(),
                        description: None,
                        disabled: false,
                    },
                ],
            },
        },
        FieldDef {
            key: "ciProvider".into(),
            label: "CI Provider".into(),
            optional: false,
            show_when: Some(ShowWhen {
                field: "ci".into(),
                equals: "yes".into(),
            }),
            control: FieldControl::Select {
                options: vec![
                    option("GitHub Actions", "github-actions", "CI/CD built into GitHub"),
                    option("GitLab CI", "gitlab-ci", "GitLab's integrated CI/CD"),
                ],
            },
        },
        FieldDef {
            key: "readme".into(),
            label: "README template".into(),
            optional: false,
            show_when: None,
            control: FieldControl::Template {
                options: vec![
                    TemplateOption {
                        label: "Minimal".into(),
                        value: "minimal".into(),
                        description: None,
                        disabled: false,
                        content: Some("# {{name}}\n\n{{description}}".into()),
                    },
                    TemplateOption {
                        label: "Detailed".into(),
                        value: "detailed".into(),
                        description: None,
                        disabled: false,
                        content: Some(
                            "# {{name}}\n\n## Overview\n{{description}}\n\n## Getting Started\n\n```bash\nnpm install\nnpm run dev\n```\n\n## License\nMIT"
                                .into(),
                        ),
                    },
                ],
                store_name: "readme-templates".into(),
            },
        },
    ]
}

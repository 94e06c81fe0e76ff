use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::fs;
use std::path::PathBuf;

const DEFAULT_ENTRY_NAME: &str = "app.css";
const DEFAULT_CONFIG_NAME: &str = "zephyr.config.json";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Source directory for content files
    #[arg(short, long, default_value = "src")]
    pub src_dir: String,

    /// Force overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let entry_path = PathBuf::from(cwd).join(DEFAULT_ENTRY_NAME);

    if entry_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_ENTRY_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Zephyr project...".bright_blue().bold());

    let src_dir = PathBuf::from(cwd).join(&args.src_dir);
    if !src_dir.exists() {
        fs::create_dir_all(&src_dir)?;
        println!("  {} Created {}/", "✓".green(), args.src_dir);
    }

    let example_file = src_dir.join("index.html");
    if !example_file.exists() {
        let example_content = r##"<!doctype html>
<html>
  <body>
    <main class="flex p-4 gap-2">
      <a class="font-bold hover:underline text-primary" href="#">Zephyr</a>
    </main>
  </body>
</html>
"##;
        fs::write(&example_file, example_content)?;
        println!("  {} Created {}/index.html", "✓".green(), args.src_dir);
    }

    let entry_content = format!(
        "@config \"{config}\";\n\n@theme {{\n  --color-primary: #3b82f6;\n}}\n\nbody {{\n  margin: 0;\n}}\n\n@utilities;\n",
        config = DEFAULT_CONFIG_NAME
    );
    fs::write(&entry_path, entry_content)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_ENTRY_NAME);

    let config = json!({
        "content": [format!("{}/**/*.html", args.src_dir)],
        "important": false,
    });
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}/index.html", args.src_dir);
    println!("  2. Run: zephyr build --output dist/app.css");
    println!("  3. Add --watch to rebuild on change");

    Ok(())
}

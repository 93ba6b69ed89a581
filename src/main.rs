mod bundle;
mod character;
mod config;
mod error;
mod forge;
mod gemini;
mod prompt;
mod ui;

use anyhow::Result;
use config::Config;
use forge::ForgeSession;
use inquire::Confirm;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            eprintln!("Please ensure 'config.yml' is valid YAML.");
            return Err(e);
        }
    };

    config.ensure_directories()?;

    // Fatal without a credential: every stage needs the API.
    let client = gemini::create_client(&config)?;
    let mut session = ForgeSession::new(client);

    println!("CharacterForge");
    println!("Generate complete character packages with AI\n");

    loop {
        let form = ui::collect_form(session.client()).await?;
        session.generate(&form).await;

        print!("\n{}", ui::render_sheet(session.state()));

        if session.state().character.is_some()
            && Confirm::new("Export metadata bundle?")
                .with_default(true)
                .prompt()?
        {
            let path = ui::export_bundle(&config, session.state())?;
            println!("Bundle written to {}", path.display());
        }

        if !Confirm::new("Forge another character?")
            .with_default(false)
            .prompt()?
        {
            break;
        }
        println!();
    }

    Ok(())
}

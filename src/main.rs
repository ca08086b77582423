use log::{error, info};

use narrator::util::logging;
use narrator::{NarrationController, OutputFormat};

fn default_input() -> String {
    std::env::var("NARRATOR_INPUT")
        .unwrap_or_else(|_| "e-books/alices-adventures-in-wonderland.pdf".to_string())
}

fn run() -> anyhow::Result<()> {
    let input = default_input();
    info!("narrating {input}");

    let mut controller = NarrationController::new(1.5);
    controller.set_language("en");
    let report = controller.narrate(&input, OutputFormat::Mp3)?;
    info!("narration report: {}", serde_json::to_string(&report)?);

    // controller.set_language("fr");
    // controller.narrate(&input, OutputFormat::Wav)?;

    Ok(())
}

fn main() {
    if let Err(err) = logging::init() {
        eprintln!("failed to initialise logger: {err}");
    }
    info!("starting narrator");

    if let Err(err) = run() {
        error!("narration failed: {err:#}");
    }

    println!("work done");
}

// Interactive console host for the dashboard.
//
// The menu stands in for an upload widget: the user names a file, its bytes
// are read once, and one full pass renders the dashboard. Nothing is kept
// between uploads.
use marketing_report::{output, process_upload, DashboardConfig};
use std::io::{self, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy)]
enum RenderMode {
    Console,
    Json,
}

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask whether to return to the upload menu. `true` for `Y`.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = read_line("Back to upload menu (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Read the named file and render one dashboard from it. Every failure is
/// reported here as a single message.
fn handle_upload(mode: RenderMode, config: &DashboardConfig) {
    let Some(path) = read_line("Path to CSV/Excel file: ") else {
        return;
    };
    if path.is_empty() {
        println!("Upload your CSV/Excel file to generate the dashboard.\n");
        return;
    }

    let bytes = match std::fs::read(&path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error processing file: {}\n", e);
            return;
        }
    };
    let file_name = Path::new(&path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.clone());

    let rendered = process_upload(&file_name, &bytes, config).and_then(|d| match mode {
        RenderMode::Console => Ok(output::render_console(&d)),
        RenderMode::Json => output::render_json(&d),
    });
    match rendered {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error processing file: {}\n", e),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = DashboardConfig::default();
    println!("Marketing Performance Dashboard");
    println!("Columns expected: Date, Channel, Campaign, Creative, Spend, Revenue, Orders\n");

    loop {
        println!("[1] Upload a file");
        println!("[2] Upload a file (JSON view payloads)");
        println!("[3] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        let mode = match choice.as_str() {
            "1" => RenderMode::Console,
            "2" => RenderMode::Json,
            "3" => break,
            _ => {
                println!("Invalid choice. Please enter 1, 2 or 3.\n");
                continue;
            }
        };
        println!();
        handle_upload(mode, &config);
        if !prompt_back_to_menu() {
            break;
        }
    }
    println!("Exiting the program.");
}

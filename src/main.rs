//! relay – send an HTML file to the rendering backend and write the PDF.
//!
//! Usage:
//!   relay <input.html> [output.pdf] [--landscape] [--format a4]
//!         [--header header.html] [--footer footer.html] [--wait 1s]
//!         [--name report.pdf]
//!
//! Backend URL and key come from `PDF_SERVICE_URL` / `PDF_SERVICE_KEY` or the
//! TOML file named by `PDF_SERVICE_CONFIG`. If `output.pdf` is omitted the PDF
//! is written next to the input file, named after `--name` when given and
//! after the input's stem otherwise.

use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

use pdf_relay::{filename, PdfService};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut landscape = false;
    let mut format: Option<String> = None;
    let mut header_path: Option<PathBuf> = None;
    let mut footer_path: Option<PathBuf> = None;
    let mut wait: Option<String> = None;
    let mut name: Option<String> = None;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--landscape" | "-l" => landscape = true,
            "--format" | "-f" => format = Some(flag_value(&mut iter, arg, &args[0])),
            "--header" => header_path = Some(PathBuf::from(flag_value(&mut iter, arg, &args[0]))),
            "--footer" => footer_path = Some(PathBuf::from(flag_value(&mut iter, arg, &args[0]))),
            "--wait" | "-w" => wait = Some(flag_value(&mut iter, arg, &args[0])),
            "--name" | "-n" => name = Some(flag_value(&mut iter, arg, &args[0])),
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no input file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let output = output_path.unwrap_or_else(|| default_output(&input, name.as_deref()));

    let html = read_or_exit(&input);

    let mut service = match PdfService::make(None, None) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Set PDF_SERVICE_URL and PDF_SERVICE_KEY, or point PDF_SERVICE_CONFIG at a config file.");
            process::exit(1);
        }
    };

    if let Some(format) = format {
        service = match service.format(format) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        };
    }
    if landscape {
        service = service.landscape();
    }
    if let Some(wait) = wait {
        service = service.wait_delay(&wait);
    }
    if let Some(path) = header_path {
        service = service.header_html(&read_or_exit(&path));
    }
    if let Some(path) = footer_path {
        service = service.footer_html(&read_or_exit(&path));
    }
    if let Some(name) = &name {
        service = service.name(name);
    }

    match service.html(&html).content() {
        Ok(bytes) => {
            // Create output directory if necessary.
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        eprintln!("Error creating output directory: {e}");
                        process::exit(1);
                    }
                }
            }
            if let Err(e) = fs::write(&output, &bytes) {
                eprintln!("Error writing '{}': {e}", output.display());
                process::exit(1);
            }
            eprintln!("Wrote '{}' ({} bytes)", output.display(), bytes.len());
        }
        Err(e) => {
            eprintln!("Error generating PDF: {e}");
            process::exit(1);
        }
    }
}

/// Output path when none is given: the input's directory, named after
/// `name` (sanitized) or the input's stem, always with a `.pdf` extension.
fn default_output(input: &Path, name: Option<&str>) -> PathBuf {
    let mut output = match name {
        Some(name) => input.with_file_name(filename::sanitize(name)),
        None => input.to_path_buf(),
    };
    output.set_extension("pdf");
    output
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str, prog: &str) -> String {
    match iter.next() {
        Some(v) => v.clone(),
        None => {
            eprintln!("Missing value for {flag}");
            print_usage(prog);
            process::exit(1);
        }
    }
}

fn read_or_exit(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", path.display());
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("relay – HTML to PDF through a rendering backend (pdf-relay)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <input.html> [output.pdf] [--landscape] [--format a4] [--header FILE] [--footer FILE] [--wait 1s] [--name N]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <input.html>   HTML file to convert (@pageNumber, @pageBreak, ... are expanded)");
    eprintln!("  [output.pdf]   Output path  (default: --name or the input stem, with .pdf)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --format, -f   Page format: letter, legal, tabloid, a0-a6 (default: a4)");
    eprintln!("  --landscape    Use landscape page orientation");
    eprintln!("  --header       HTML file for the running header");
    eprintln!("  --footer       HTML file for the running footer");
    eprintln!("  --wait, -w     Delay before printing, e.g. 500ms or 2s");
    eprintln!("  --name, -n     Document name; also names the default output file");
    eprintln!("  --help         Print this message");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PDF_SERVICE_URL, PDF_SERVICE_KEY, PDF_SERVICE_CONFIG");
}

//! # Paginate CLI
//!
//! Usage:
//!   paginate input.json -o layout.json
//!   echo '{ ... }' | paginate -o layout.json
//!   paginate --example > report.json
//!
//! Pages the document with the built-in block oracle and writes the layout
//! snapshot (pages, regions, oversized boxes) as JSON. Set `RUST_LOG=debug`
//! to see page creation.

use std::env;
use std::fs;
use std::io::{self, Read};

use paginate::PaginateError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_report_json());
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), PaginateError> {
    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1])?
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    };

    let layout = paginate::paginate_json(&input)?;

    // Parse output path; stdout when absent
    match args.windows(2).find(|w| w[0] == "-o").map(|w| w[1].clone()) {
        Some(path) => {
            fs::write(&path, &layout)?;
            log::info!("✓ Written {} bytes to {}", layout.len(), path);
        }
        None => println!("{}", layout),
    }
    Ok(())
}

fn example_report_json() -> &'static str {
    r##"{
  "page": {
    "size": { "Custom": { "width": 400, "height": 300 } },
    "headerHeight": 40,
    "footerHeight": 30,
    "footer": [
      { "tag": "span", "text": "Page " },
      { "tag": "paginate-target", "attributes": { "data-key": "pageNumber" } },
      { "tag": "span", "text": " of " },
      { "tag": "paginate-target", "attributes": { "data-key": "totalPages" } }
    ]
  },
  "root": {
    "tag": "body",
    "children": [
      {
        "tag": "paginate-source",
        "attributes": { "data-key": "header" },
        "children": [
          { "tag": "strong", "text": "Quarterly Report" },
          { "tag": "span", "text": " / " },
          { "tag": "paginate-target", "attributes": { "data-key": "chapter" } }
        ]
      },
      {
        "tag": "paginate-source",
        "attributes": { "data-key": "chapter" },
        "children": [{ "tag": "span", "text": "Summary" }]
      },
      { "tag": "h1", "text": "Summary", "style": { "height": 40 } },
      { "tag": "p", "text": "Revenue grew in every region.", "style": { "height": 60 } },
      {
        "tag": "table",
        "children": [
          {
            "tag": "thead",
            "children": [
              {
                "tag": "tr",
                "children": [
                  { "tag": "th", "text": "Region", "style": { "height": 20 } },
                  { "tag": "th", "text": "Revenue", "style": { "height": 20 } }
                ]
              }
            ]
          },
          {
            "tag": "tbody",
            "children": [
              { "tag": "tr", "style": { "breakInside": "avoid" }, "children": [
                { "tag": "td", "text": "North", "style": { "height": 30 } },
                { "tag": "td", "text": "1.2M", "style": { "height": 30 } }
              ]},
              { "tag": "tr", "style": { "breakInside": "avoid" }, "children": [
                { "tag": "td", "text": "South", "style": { "height": 30 } },
                { "tag": "td", "text": "0.9M", "style": { "height": 30 } }
              ]},
              { "tag": "tr", "style": { "breakInside": "avoid" }, "children": [
                { "tag": "td", "text": "East", "style": { "height": 30 } },
                { "tag": "td", "text": "1.4M", "style": { "height": 30 } }
              ]},
              { "tag": "tr", "style": { "breakInside": "avoid" }, "children": [
                { "tag": "td", "text": "West", "style": { "height": 30 } },
                { "tag": "td", "text": "1.1M", "style": { "height": 30 } }
              ]}
            ]
          }
        ]
      },
      {
        "tag": "paginate-source",
        "attributes": { "data-key": "chapter" },
        "style": { "breakBefore": "page" },
        "children": [{ "tag": "span", "text": "Outlook" }]
      },
      { "tag": "h1", "text": "Outlook", "style": { "height": 40 } },
      { "tag": "p", "text": "Expansion continues next quarter.", "style": { "height": 60 } }
    ]
  }
}
"##
}

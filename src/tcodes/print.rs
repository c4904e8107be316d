use colored::Colorize;
use tcodes::commands::{CmdMessage, MessageLevel};
use tcodes::model::{CatalogEntry, Origin};
use tcodes::query::TagCounts;
use tcodes::settings::Settings;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const CODE_WIDTH: usize = 22;
const FAVORITE_MARKER: &str = "★";

pub(crate) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

/// Cuts `text` to at most `width` display columns, marking the cut with `…`.
fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn pad_to_width(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

pub(crate) fn print_entries(entries: &[CatalogEntry]) {
    if entries.is_empty() {
        println!("No transaction codes found.");
        return;
    }

    let mut last_was_favorite = false;
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 && last_was_favorite && !entry.favorite {
            println!();
        }
        last_was_favorite = entry.favorite;

        let marker = if entry.favorite {
            format!("{} ", FAVORITE_MARKER)
        } else {
            "  ".to_string()
        };
        let code = pad_to_width(&truncate_to_width(&entry.code, CODE_WIDTH), CODE_WIDTH);
        let tags = entry.tags.iter().cloned().collect::<Vec<_>>().join(",");
        let tag_col = format!("[{}]", tags);

        let used = marker.width() + CODE_WIDTH + 1 + tag_col.width() + 1;
        let title = truncate_to_width(&entry.title, LINE_WIDTH.saturating_sub(used));
        let code = match entry.origin {
            Origin::Custom => code.cyan(),
            Origin::Reference => code.normal(),
        };

        println!("{}{} {} {}", marker.yellow(), code.bold(), title, tag_col.dimmed());
    }
}

pub(crate) fn print_counts(counts: &TagCounts) {
    println!("{} {}", pad_to_width("ALL", 10).bold(), counts.all);
    for (tag, count) in &counts.per_tag {
        let line = format!("{} {}", pad_to_width(tag, 10), count);
        if *count == 0 {
            println!("{}", line.dimmed());
        } else {
            println!("{}", line);
        }
    }
}

pub(crate) fn print_settings(settings: &Settings) {
    let rows = [
        ("copy-option", settings.copy_option.to_string()),
        ("sap-system-url", settings.sap_system_url.clone()),
        (
            "reset-search-after-copy",
            settings.reset_search_after_copy.to_string(),
        ),
        ("theme", settings.theme.to_string()),
        (
            "visible-groups",
            settings
                .visible_groups
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(","),
        ),
        ("sort-order", settings.sort_order.to_string()),
    ];
    for (key, value) in rows {
        println!("{} {}", pad_to_width(key, 24).bold(), value);
    }
}

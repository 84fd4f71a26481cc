use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Color as CtColor, Stylize};

// ═══════════════════════════════════════════════════════════════════════════════
// Clap Styles
// ═══════════════════════════════════════════════════════════════════════════════

fn bold(color: AnsiColor) -> Style {
    Style::new().bold().fg_color(Some(Color::Ansi(color)))
}

/// Help colours for both binaries: headings in the warm end of the mood
/// palette, flags in the cool end.
pub fn get_styles() -> Styles {
    Styles::styled()
        .usage(bold(AnsiColor::Yellow).underline())
        .header(bold(AnsiColor::Yellow).underline())
        .literal(bold(AnsiColor::Cyan))
        .invalid(bold(AnsiColor::Red))
        .error(bold(AnsiColor::Red))
        .valid(bold(AnsiColor::Green))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Text over the gradient
// ═══════════════════════════════════════════════════════════════════════════════

pub mod colors {
    use crossterm::style::Color;

    pub const INK: Color = Color::Rgb {
        r: 16,
        g: 16,
        b: 24,
    };
    pub const PAPER: Color = Color::Rgb {
        r: 250,
        g: 250,
        b: 250,
    };
    pub const RED: Color = Color::Rgb {
        r: 255,
        g: 85,
        b: 85,
    };
    pub const DARK_RED: Color = Color::Rgb {
        r: 150,
        g: 0,
        b: 0,
    };
    pub const GREEN: Color = Color::Rgb {
        r: 0,
        g: 255,
        b: 136,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Glyphs
// ═══════════════════════════════════════════════════════════════════════════════

pub mod glyphs {
    pub const PROMPT: &str = "❯";
    pub const REMOVE: &str = "[x]";
    pub const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];
    pub const CHECK: &str = "✓";
    pub const CROSS_MARK: &str = "✗";
}

/// Perceived brightness of an sRGB colour, 0..=255.
fn luma((r, g, b): (u8, u8, u8)) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

/// Text colour readable on top of `background`.
pub fn text_color_on(background: (u8, u8, u8)) -> CtColor {
    if luma(background) > 140.0 {
        colors::INK
    } else {
        colors::PAPER
    }
}

/// Error colour readable on top of `background`.
pub fn error_color_on(background: (u8, u8, u8)) -> CtColor {
    if luma(background) > 140.0 {
        colors::DARK_RED
    } else {
        colors::RED
    }
}

pub fn rgb((r, g, b): (u8, u8, u8)) -> CtColor {
    CtColor::Rgb { r, g, b }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Status Indicators
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_success(message: &str) {
    println!(
        " {} {}",
        glyphs::CHECK.with(colors::GREEN).bold(),
        message.with(colors::GREEN)
    );
}

pub fn print_error(message: &str) {
    eprintln!(
        " {} {}",
        glyphs::CROSS_MARK.with(colors::RED).bold(),
        message.with(colors::RED)
    );
}

use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for the screens' terminal output
#[derive(Debug, Clone)]
pub struct Theme {
    /// Headers and section titles
    pub title: Style,
    /// Field labels
    pub label: Style,
    /// Remarks and other secondary text
    pub note: Style,
    /// Banner titles and movement kinds
    pub accent: Style,
    pub ok: Style,
    pub failure: Style,
    pub caution: Style,
    /// Quantities entering stock
    pub stock_in: Style,
    /// Quantities leaving stock
    pub stock_out: Style,
    pub low_stock: Style,
}

impl Theme {
    /// Colour only when stdout is a terminal and NO_COLOR is unset
    pub fn detect() -> Self {
        let enabled = console::Term::stdout().is_term() && std::env::var_os("NO_COLOR").is_none();
        Self::with_color(enabled)
    }

    pub fn with_color(enabled: bool) -> Self {
        let pick = |style: Style| if enabled { style } else { Style::new() };
        Self {
            title: pick(Style::new().cyan().bold()),
            label: pick(Style::new().dimmed()),
            note: pick(Style::new().bright_black()),
            accent: pick(Style::new().magenta()),
            ok: pick(Style::new().green().bold()),
            failure: pick(Style::new().red().bold()),
            caution: pick(Style::new().yellow().bold()),
            stock_in: pick(Style::new().green()),
            stock_out: pick(Style::new().yellow()),
            low_stock: pick(Style::new().red().bold()),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

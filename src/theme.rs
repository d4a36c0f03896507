//! Handle the color theme
use ratatui::style::{Color, Modifier, Style};

use crate::options::SearchOptions;

/// The color scheme of the dropdown
///
/// <pre>
/// +--------------------------------------+
/// |> octo                           ⠋ 2/3|  --> prompt & query & spinner
/// |> @octocat                            |  --> cursor & current
/// |  octo/hello  ★ 12  ⑂ 3  Rust  Hi     |  --> normal & meta & description
/// |API rate limit exceeded               |  --> error
/// |Type at least 3 characters to search  |  --> info
/// +--------------------------------------+
/// </pre>
#[derive(Copy, Clone, Debug, Default)]
pub struct ColorTheme {
    /// Result rows and general text
    pub normal: Style,
    /// Highlighted row
    pub current: Style,
    /// Query text
    pub query: Style,
    /// Loading glyph
    pub spinner: Style,
    /// Hints and empty states
    pub info: Style,
    /// Prompt prefix
    pub prompt: Style,
    /// Pointer in front of the highlighted row
    pub cursor: Style,
    /// Error message
    pub error: Style,
    /// Star/fork counts and language
    pub meta: Style,
    /// Repository description
    pub description: Style,
}

impl ColorTheme {
    /// Setup the theme from the search options
    pub fn init_from_options(options: &SearchOptions) -> ColorTheme {
        if let Some(color) = options.color.as_deref() {
            ColorTheme::from_options(color)
        } else {
            match std::env::var_os("NO_COLOR") {
                Some(no_color) if !no_color.is_empty() => ColorTheme::none(),
                _ => ColorTheme::dark256(),
            }
        }
    }

    fn none() -> Self {
        Self {
            spinner: Style::default().bold(),
            description: Style::default().dim(),
            ..ColorTheme::default()
        }
    }

    fn bw() -> Self {
        let base = ColorTheme::none();
        ColorTheme {
            current: base.current.reversed(),
            error: base.error.bold(),
            ..base
        }
    }

    fn default16() -> Self {
        let base = ColorTheme::none();
        ColorTheme {
            current: base.current.fg(Color::Yellow),
            spinner: base.spinner.fg(Color::Green),
            info: base.info.fg(Color::White),
            prompt: base.prompt.fg(Color::Blue),
            cursor: base.cursor.fg(Color::Red),
            error: base.error.fg(Color::Red),
            meta: base.meta.fg(Color::Cyan),
            ..base
        }
    }

    fn dark256() -> Self {
        let base = ColorTheme::none();
        ColorTheme {
            current: base.current.bg(Color::Indexed(236)),
            spinner: base.spinner.fg(Color::Indexed(148)),
            info: base.info.fg(Color::Indexed(144)),
            prompt: base.prompt.fg(Color::Indexed(110)),
            cursor: base.cursor.fg(Color::Indexed(161)),
            error: base.error.fg(Color::Indexed(203)),
            meta: base.meta.fg(Color::Indexed(109)),
            ..base
        }
    }

    fn light256() -> Self {
        let base = ColorTheme::none();
        ColorTheme {
            current: base.current.bg(Color::Indexed(251)),
            spinner: base.spinner.fg(Color::Indexed(65)),
            info: base.info.fg(Color::Indexed(101)),
            prompt: base.prompt.fg(Color::Indexed(25)),
            cursor: base.cursor.fg(Color::Indexed(161)),
            error: base.error.fg(Color::Indexed(160)),
            meta: base.meta.fg(Color::Indexed(31)),
            ..base
        }
    }

    fn set_color(&mut self, name: &str, spec: &str) {
        let spec_parts: Vec<_> = spec.split(&['+', ':']).collect();

        let raw_color = spec_parts[0];
        let new_color = if raw_color.len() == 7 && raw_color.starts_with('#') {
            let r = u8::from_str_radix(&raw_color[1..3], 16).unwrap_or(255);
            let g = u8::from_str_radix(&raw_color[3..5], 16).unwrap_or(255);
            let b = u8::from_str_radix(&raw_color[5..7], 16).unwrap_or(255);
            Some(Color::Rgb(r, g, b))
        } else {
            raw_color.parse::<u8>().ok().map(Color::Indexed).or_else(|| {
                debug!("Unknown color '{raw_color}'");
                None
            })
        };

        let mut modifier = Modifier::empty();
        for part in spec_parts.iter().skip(1) {
            if matches!(*part, "x" | "regular") {
                modifier = Modifier::empty()
            } else {
                modifier |= match *part {
                    "b" | "bold" => Modifier::BOLD,
                    "u" | "underlined" => Modifier::UNDERLINED,
                    "d" | "dim" => Modifier::DIM,
                    "i" | "italic" => Modifier::ITALIC,
                    "r" | "reverse" => Modifier::REVERSED,
                    m => {
                        debug!("Unknown modifier '{m}'");
                        Modifier::empty()
                    }
                };
            }
        }

        let (component, layer) = match name.strip_suffix("_bg").or_else(|| name.strip_suffix("-bg")) {
            Some(component) => (component, Layer::Bg),
            None => match name.strip_suffix("_fg").or_else(|| name.strip_suffix("-fg")) {
                Some(component) => (component, Layer::Fg),
                None if name == "bg" => ("", Layer::Bg),
                None => (name, Layer::Fg),
            },
        };

        let target = match component {
            "" | "normal" => &mut self.normal,
            "current" | "fg+" => &mut self.current,
            "bg+" => {
                set_style(&mut self.current, Layer::Bg, new_color, modifier);
                return;
            }
            "query" => &mut self.query,
            "spinner" => &mut self.spinner,
            "info" => &mut self.info,
            "prompt" => &mut self.prompt,
            "cursor" | "pointer" => &mut self.cursor,
            "error" => &mut self.error,
            "meta" => &mut self.meta,
            "description" | "desc" => &mut self.description,
            c => {
                debug!("Unknown theme component '{c}'");
                return;
            }
        };
        set_style(target, layer, new_color, modifier);
    }

    fn from_options(color: &str) -> Self {
        let mut theme = ColorTheme::dark256();
        for pair in color.split(',') {
            if let Some((name, spec)) = pair.split_once(':') {
                theme.set_color(name, spec);
            } else {
                theme = match pair {
                    "light" => ColorTheme::light256(),
                    "16" => ColorTheme::default16(),
                    "bw" => ColorTheme::bw(),
                    "none" | "empty" => ColorTheme::none(),
                    "dark" | "default" => ColorTheme::dark256(),
                    t => {
                        debug!("Unknown color theme '{t}'");
                        ColorTheme::dark256()
                    }
                };
            }
        }
        theme
    }
}

#[derive(Clone, Copy)]
enum Layer {
    Fg,
    Bg,
}

fn set_style(s: &mut Style, layer: Layer, color: Option<Color>, modifier: Modifier) {
    if let Some(c) = color {
        *s = match layer {
            Layer::Fg => s.fg(c),
            Layer::Bg => s.bg(c),
        }
    }
    *s = s.add_modifier(modifier);
}

//! Static display tables for creature types.
//!
//! Pure process-wide constant mappings; nothing here ever mutates.

use ratatui::style::Color;

const TYPE_ICON_SHEET: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/types/generation-ix/scarlet-violet";

pub fn type_color(name: &str) -> Color {
    match name {
        "normal" => Color::Rgb(168, 168, 120),
        "fire" => Color::Rgb(240, 128, 48),
        "water" => Color::Rgb(104, 144, 240),
        "electric" => Color::Rgb(248, 208, 48),
        "grass" => Color::Rgb(120, 200, 80),
        "ice" => Color::Rgb(152, 216, 216),
        "fighting" => Color::Rgb(192, 48, 40),
        "poison" => Color::Rgb(160, 64, 160),
        "ground" => Color::Rgb(224, 192, 104),
        "flying" => Color::Rgb(168, 144, 240),
        "psychic" => Color::Rgb(248, 88, 136),
        "bug" => Color::Rgb(168, 184, 32),
        "rock" => Color::Rgb(184, 160, 56),
        "ghost" => Color::Rgb(112, 88, 152),
        "dragon" => Color::Rgb(112, 56, 248),
        "dark" => Color::Rgb(112, 88, 72),
        "steel" => Color::Rgb(184, 184, 208),
        "fairy" => Color::Rgb(238, 153, 172),
        _ => Color::Gray,
    }
}

fn type_icon_id(name: &str) -> &'static str {
    match name {
        "normal" => "1",
        "fighting" => "2",
        "flying" => "3",
        "poison" => "4",
        "ground" => "5",
        "rock" => "6",
        "bug" => "7",
        "ghost" => "8",
        "steel" => "9",
        "fire" => "10",
        "water" => "11",
        "grass" => "12",
        "electric" => "13",
        "psychic" => "14",
        "ice" => "15",
        "dragon" => "16",
        "dark" => "17",
        "fairy" => "18",
        "stellar" => "19",
        _ => "10001",
    }
}

pub fn type_icon_url(name: &str) -> String {
    format!("{TYPE_ICON_SHEET}/{}.png", type_icon_id(name))
}

use plotters::style::RGBColor;

/// Station colors, a ColorBrewer-ish table cycled by index.
pub const STATION_COLORS: [RGBColor; 12] = [
    RGBColor(204, 76, 2),
    RGBColor(1, 108, 89),
    RGBColor(54, 144, 192),
    RGBColor(153, 52, 4),
    RGBColor(2, 129, 138),
    RGBColor(236, 112, 20),
    RGBColor(103, 169, 207),
    RGBColor(254, 153, 41),
    RGBColor(1, 70, 54),
    RGBColor(127, 201, 127),
    RGBColor(190, 174, 212),
    RGBColor(102, 37, 6),
];

/// Color for the nth station, cycling when there are more stations
/// than table entries.
pub fn station_color(index: usize) -> RGBColor {
    STATION_COLORS[index % STATION_COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::{station_color, STATION_COLORS};

    #[test]
    fn test_cycles_past_table_end() {
        assert_eq!(station_color(0), STATION_COLORS[0]);
        assert_eq!(station_color(12), STATION_COLORS[0]);
        assert_eq!(station_color(13), STATION_COLORS[1]);
    }
}

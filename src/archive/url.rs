//! Archive URL construction

/// Monthly image directory of the NSIDC Sea Ice Index (G02135), northern hemisphere
pub const BASE_URL: &str =
    "https://masie_web.apps.nsidc.org/pub/DATASETS/NOAA/G02135/north/monthly/images";

/// Month directories, `<two-digit month>_<abbreviation>`
pub const MONTH_PREFIXES: [&str; 12] = [
    "01_Jan", "02_Feb", "03_Mar", "04_Apr", "05_May", "06_Jun",
    "07_Jul", "08_Aug", "09_Sep", "10_Oct", "11_Nov", "12_Dec",
];

pub const START_YEAR: u32 = 1979;
pub const END_YEAR: u32 = 2023;

/// Concentration image URL for one month.
///
/// The month number is the first two characters of `month_prefix`.
pub fn archive_url(month_prefix: &str, year: u32) -> String {
    let month_number = month_prefix.get(..2).unwrap_or(month_prefix);
    format!("{BASE_URL}/{month_prefix}/N_{year}{month_number}_conc_v3.0.png")
}

/// Every archive URL, year-major from [`START_YEAR`] to [`END_YEAR`] inclusive
pub fn archive_urls() -> impl Iterator<Item = String> {
    (START_YEAR..=END_YEAR)
        .flat_map(|year| MONTH_PREFIXES.iter().map(move |prefix| archive_url(prefix, year)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_march_2020() {
        assert_eq!(
            archive_url("03_Mar", 2020),
            format!("{BASE_URL}/03_Mar/N_202003_conc_v3.0.png")
        );
    }

    #[test]
    fn test_crawl_order_and_count() {
        let urls: Vec<String> = archive_urls().collect();
        assert_eq!(urls.len(), 45 * 12);
        assert!(urls[0].ends_with("/01_Jan/N_197901_conc_v3.0.png"));
        assert!(urls[1].ends_with("/02_Feb/N_197902_conc_v3.0.png"));
        assert!(urls.last().unwrap().ends_with("/12_Dec/N_202312_conc_v3.0.png"));
    }
}

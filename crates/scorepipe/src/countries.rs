//! Country names as the tournament API reports them, mapped to the
//! lowercase two-letter codes the overlay uses for flag images.

/// `(code, name)` pairs, sorted by code.
pub const COUNTRIES: &[(&str, &str)] = &[
    ("ad", "Andorra"),
    ("ae", "United Arab Emirates"),
    ("af", "Afghanistan"),
    ("ag", "Antigua and Barbuda"),
    ("al", "Albania"),
    ("am", "Armenia"),
    ("ao", "Angola"),
    ("ar", "Argentina"),
    ("at", "Austria"),
    ("au", "Australia"),
    ("az", "Azerbaijan"),
    ("ba", "Bosnia and Herzegovina"),
    ("bb", "Barbados"),
    ("bd", "Bangladesh"),
    ("be", "Belgium"),
    ("bf", "Burkina Faso"),
    ("bg", "Bulgaria"),
    ("bh", "Bahrain"),
    ("bi", "Burundi"),
    ("bj", "Benin"),
    ("bn", "Brunei"),
    ("bo", "Bolivia"),
    ("br", "Brazil"),
    ("bs", "Bahamas"),
    ("bt", "Bhutan"),
    ("bw", "Botswana"),
    ("by", "Belarus"),
    ("bz", "Belize"),
    ("ca", "Canada"),
    ("cd", "Democratic Republic of the Congo"),
    ("cf", "Central African Republic"),
    ("cg", "Republic of the Congo"),
    ("ch", "Switzerland"),
    ("ci", "Ivory Coast"),
    ("cl", "Chile"),
    ("cm", "Cameroon"),
    ("cn", "China"),
    ("co", "Colombia"),
    ("cr", "Costa Rica"),
    ("cu", "Cuba"),
    ("cv", "Cape Verde"),
    ("cy", "Cyprus"),
    ("cz", "Czech Republic"),
    ("de", "Germany"),
    ("dj", "Djibouti"),
    ("dk", "Denmark"),
    ("dm", "Dominica"),
    ("do", "Dominican Republic"),
    ("dz", "Algeria"),
    ("ec", "Ecuador"),
    ("ee", "Estonia"),
    ("eg", "Egypt"),
    ("er", "Eritrea"),
    ("es", "Spain"),
    ("et", "Ethiopia"),
    ("fi", "Finland"),
    ("fj", "Fiji"),
    ("fm", "Micronesia"),
    ("fr", "France"),
    ("ga", "Gabon"),
    ("gb", "United Kingdom"),
    ("gd", "Grenada"),
    ("ge", "Georgia"),
    ("gh", "Ghana"),
    ("gm", "Gambia"),
    ("gn", "Guinea"),
    ("gq", "Equatorial Guinea"),
    ("gr", "Greece"),
    ("gt", "Guatemala"),
    ("gu", "Guam"),
    ("gw", "Guinea-Bissau"),
    ("gy", "Guyana"),
    ("hk", "Hong Kong"),
    ("hn", "Honduras"),
    ("hr", "Croatia"),
    ("ht", "Haiti"),
    ("hu", "Hungary"),
    ("id", "Indonesia"),
    ("ie", "Ireland"),
    ("il", "Israel"),
    ("in", "India"),
    ("iq", "Iraq"),
    ("ir", "Iran"),
    ("is", "Iceland"),
    ("it", "Italy"),
    ("jm", "Jamaica"),
    ("jo", "Jordan"),
    ("jp", "Japan"),
    ("ke", "Kenya"),
    ("kg", "Kyrgyzstan"),
    ("kh", "Cambodia"),
    ("ki", "Kiribati"),
    ("km", "Comoros"),
    ("kn", "Saint Kitts and Nevis"),
    ("kp", "North Korea"),
    ("kr", "South Korea"),
    ("kw", "Kuwait"),
    ("kz", "Kazakhstan"),
    ("la", "Laos"),
    ("lb", "Lebanon"),
    ("lc", "Saint Lucia"),
    ("li", "Liechtenstein"),
    ("lk", "Sri Lanka"),
    ("lr", "Liberia"),
    ("ls", "Lesotho"),
    ("lt", "Lithuania"),
    ("lu", "Luxembourg"),
    ("lv", "Latvia"),
    ("ly", "Libya"),
    ("ma", "Morocco"),
    ("mc", "Monaco"),
    ("md", "Moldova"),
    ("me", "Montenegro"),
    ("mg", "Madagascar"),
    ("mh", "Marshall Islands"),
    ("mk", "North Macedonia"),
    ("ml", "Mali"),
    ("mm", "Myanmar"),
    ("mn", "Mongolia"),
    ("mo", "Macau"),
    ("mr", "Mauritania"),
    ("mt", "Malta"),
    ("mu", "Mauritius"),
    ("mv", "Maldives"),
    ("mw", "Malawi"),
    ("mx", "Mexico"),
    ("my", "Malaysia"),
    ("mz", "Mozambique"),
    ("na", "Namibia"),
    ("ne", "Niger"),
    ("ng", "Nigeria"),
    ("ni", "Nicaragua"),
    ("nl", "Netherlands"),
    ("no", "Norway"),
    ("np", "Nepal"),
    ("nr", "Nauru"),
    ("nz", "New Zealand"),
    ("om", "Oman"),
    ("pa", "Panama"),
    ("pe", "Peru"),
    ("pg", "Papua New Guinea"),
    ("ph", "Philippines"),
    ("pk", "Pakistan"),
    ("pl", "Poland"),
    ("pr", "Puerto Rico"),
    ("ps", "Palestine"),
    ("pt", "Portugal"),
    ("pw", "Palau"),
    ("py", "Paraguay"),
    ("qa", "Qatar"),
    ("ro", "Romania"),
    ("rs", "Serbia"),
    ("ru", "Russia"),
    ("rw", "Rwanda"),
    ("sa", "Saudi Arabia"),
    ("sb", "Solomon Islands"),
    ("sc", "Seychelles"),
    ("sd", "Sudan"),
    ("se", "Sweden"),
    ("sg", "Singapore"),
    ("si", "Slovenia"),
    ("sk", "Slovakia"),
    ("sl", "Sierra Leone"),
    ("sm", "San Marino"),
    ("sn", "Senegal"),
    ("so", "Somalia"),
    ("sr", "Suriname"),
    ("ss", "South Sudan"),
    ("st", "Sao Tome and Principe"),
    ("sv", "El Salvador"),
    ("sy", "Syria"),
    ("sz", "Eswatini"),
    ("td", "Chad"),
    ("tg", "Togo"),
    ("th", "Thailand"),
    ("tj", "Tajikistan"),
    ("tl", "Timor-Leste"),
    ("tm", "Turkmenistan"),
    ("tn", "Tunisia"),
    ("to", "Tonga"),
    ("tr", "Turkey"),
    ("tt", "Trinidad and Tobago"),
    ("tv", "Tuvalu"),
    ("tw", "Taiwan"),
    ("tz", "Tanzania"),
    ("ua", "Ukraine"),
    ("ug", "Uganda"),
    ("us", "United States"),
    ("uy", "Uruguay"),
    ("uz", "Uzbekistan"),
    ("va", "Vatican City"),
    ("vc", "Saint Vincent and the Grenadines"),
    ("ve", "Venezuela"),
    ("vn", "Vietnam"),
    ("vu", "Vanuatu"),
    ("ws", "Samoa"),
    ("ye", "Yemen"),
    ("za", "South Africa"),
    ("zm", "Zambia"),
    ("zw", "Zimbabwe"),
];

/// Alternate spellings seen in profile locations.
const ALIASES: &[(&str, &str)] = &[
    ("Korea, Republic of", "kr"),
    ("Republic of Korea", "kr"),
    ("USA", "us"),
    ("United States of America", "us"),
    ("UK", "gb"),
    ("Great Britain", "gb"),
    ("England", "gb"),
    ("Scotland", "gb"),
    ("Wales", "gb"),
    ("Czechia", "cz"),
    ("Côte d'Ivoire", "ci"),
    ("Russian Federation", "ru"),
    ("Viet Nam", "vn"),
    ("The Netherlands", "nl"),
    ("Holland", "nl"),
    ("Türkiye", "tr"),
    ("Macedonia", "mk"),
    ("Swaziland", "sz"),
    ("Burma", "mm"),
];

/// Code for a country name, matched exactly first and then ignoring case.
pub fn code_for_name(name: &str) -> Option<&'static str> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let exact = COUNTRIES
        .iter()
        .map(|(code, country)| (*country, *code))
        .chain(ALIASES.iter().copied())
        .find(|(country, _)| *country == name);
    if let Some((_, code)) = exact {
        return Some(code);
    }

    COUNTRIES
        .iter()
        .map(|(code, country)| (*country, *code))
        .chain(ALIASES.iter().copied())
        .find(|(country, _)| country.eq_ignore_ascii_case(name))
        .map(|(_, code)| code)
}

/// Code for `name`, or `""` when the name is empty or unknown.
///
/// Unknown non-empty names are logged.
pub fn code_or_blank(name: &str) -> String {
    match code_for_name(name) {
        Some(code) => code.to_string(),
        None => {
            if !name.trim().is_empty() {
                tracing::warn!(country = name, "unknown country");
            }
            String::new()
        }
    }
}

/// Every selectable code, led by the blank "no country" entry.
pub fn country_codes() -> Vec<&'static str> {
    std::iter::once("")
        .chain(COUNTRIES.iter().map(|(code, _)| *code))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_map_to_codes() {
        assert_eq!(code_for_name("United States"), Some("us"));
        assert_eq!(code_for_name("Japan"), Some("jp"));
        assert_eq!(code_for_name("Vietnam"), Some("vn"));
        assert_eq!(code_for_name("Viet Nam"), Some("vn"));
    }

    #[test]
    fn lookup_ignores_case_and_padding() {
        assert_eq!(code_for_name("  south korea "), Some("kr"));
        assert_eq!(code_for_name("FRANCE"), Some("fr"));
    }

    #[test]
    fn unknown_or_blank_names() {
        assert_eq!(code_for_name(""), None);
        assert_eq!(code_for_name("Atlantis"), None);
        assert_eq!(code_or_blank("Atlantis"), "");
        assert_eq!(code_or_blank("Canada"), "ca");
    }

    #[test]
    fn code_list_starts_blank_and_is_unique() {
        let codes = country_codes();
        assert_eq!(codes[0], "");
        assert_eq!(codes.len(), COUNTRIES.len() + 1);

        let mut sorted = codes[1..].to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), COUNTRIES.len());
        assert!(codes[1..].iter().all(|c| c.len() == 2));
    }
}

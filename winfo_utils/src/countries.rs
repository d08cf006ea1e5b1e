//! ISO 3166-1 alpha-2 display names.
//!
//! Regulatory domains are reported by the kernel as two-letter country
//! codes; this table maps them to display names for report output. The
//! numeric key packs the two ASCII letters big-endian, matching the way
//! the codes travel in wireless country information elements.

/// Packs a two-letter country code into its numeric table key.
pub const fn code(a: u8, b: u8) -> u16 {
  ((a as u16) << 8) | b as u16
}

/// Unpacks a numeric table key into its two ASCII letters.
pub fn code_chars(iso3166: u16) -> (char, char) {
  (((iso3166 >> 8) as u8) as char, ((iso3166 & 0xff) as u8) as char)
}

/// Looks up the display name for a country code key.
pub fn country_name(iso3166: u16) -> Option<&'static str> {
  COUNTRY_NAMES
    .binary_search_by_key(&iso3166, |(k, _)| *k)
    .ok()
    .map(|i| COUNTRY_NAMES[i].1)
}

/// The ISO 3166-1 table, sorted by packed code.
pub const COUNTRY_NAMES: &[(u16, &str)] = &[
  (code(b'A', b'D'), "Andorra"),
  (code(b'A', b'E'), "United Arab Emirates"),
  (code(b'A', b'F'), "Afghanistan"),
  (code(b'A', b'G'), "Antigua and Barbuda"),
  (code(b'A', b'I'), "Anguilla"),
  (code(b'A', b'L'), "Albania"),
  (code(b'A', b'M'), "Armenia"),
  (code(b'A', b'O'), "Angola"),
  (code(b'A', b'Q'), "Antarctica"),
  (code(b'A', b'R'), "Argentina"),
  (code(b'A', b'S'), "American Samoa"),
  (code(b'A', b'T'), "Austria"),
  (code(b'A', b'U'), "Australia"),
  (code(b'A', b'W'), "Aruba"),
  (code(b'A', b'Z'), "Azerbaijan"),
  (code(b'B', b'A'), "Bosnia and Herzegovina"),
  (code(b'B', b'B'), "Barbados"),
  (code(b'B', b'D'), "Bangladesh"),
  (code(b'B', b'E'), "Belgium"),
  (code(b'B', b'F'), "Burkina Faso"),
  (code(b'B', b'G'), "Bulgaria"),
  (code(b'B', b'H'), "Bahrain"),
  (code(b'B', b'I'), "Burundi"),
  (code(b'B', b'J'), "Benin"),
  (code(b'B', b'M'), "Bermuda"),
  (code(b'B', b'N'), "Brunei Darussalam"),
  (code(b'B', b'O'), "Bolivia"),
  (code(b'B', b'R'), "Brazil"),
  (code(b'B', b'S'), "Bahamas"),
  (code(b'B', b'T'), "Bhutan"),
  (code(b'B', b'W'), "Botswana"),
  (code(b'B', b'Y'), "Belarus"),
  (code(b'B', b'Z'), "Belize"),
  (code(b'C', b'A'), "Canada"),
  (code(b'C', b'D'), "Congo, Democratic Republic"),
  (code(b'C', b'F'), "Central African Republic"),
  (code(b'C', b'G'), "Congo"),
  (code(b'C', b'H'), "Switzerland"),
  (code(b'C', b'I'), "Cote d'Ivoire"),
  (code(b'C', b'K'), "Cook Islands"),
  (code(b'C', b'L'), "Chile"),
  (code(b'C', b'M'), "Cameroon"),
  (code(b'C', b'N'), "China"),
  (code(b'C', b'O'), "Colombia"),
  (code(b'C', b'R'), "Costa Rica"),
  (code(b'C', b'U'), "Cuba"),
  (code(b'C', b'V'), "Cape Verde"),
  (code(b'C', b'Y'), "Cyprus"),
  (code(b'C', b'Z'), "Czech Republic"),
  (code(b'D', b'E'), "Germany"),
  (code(b'D', b'J'), "Djibouti"),
  (code(b'D', b'K'), "Denmark"),
  (code(b'D', b'M'), "Dominica"),
  (code(b'D', b'O'), "Dominican Republic"),
  (code(b'D', b'Z'), "Algeria"),
  (code(b'E', b'C'), "Ecuador"),
  (code(b'E', b'E'), "Estonia"),
  (code(b'E', b'G'), "Egypt"),
  (code(b'E', b'R'), "Eritrea"),
  (code(b'E', b'S'), "Spain"),
  (code(b'E', b'T'), "Ethiopia"),
  (code(b'F', b'I'), "Finland"),
  (code(b'F', b'J'), "Fiji"),
  (code(b'F', b'K'), "Falkland Islands"),
  (code(b'F', b'M'), "Micronesia"),
  (code(b'F', b'O'), "Faroe Islands"),
  (code(b'F', b'R'), "France"),
  (code(b'G', b'A'), "Gabon"),
  (code(b'G', b'B'), "United Kingdom"),
  (code(b'G', b'D'), "Grenada"),
  (code(b'G', b'E'), "Georgia"),
  (code(b'G', b'F'), "French Guiana"),
  (code(b'G', b'H'), "Ghana"),
  (code(b'G', b'I'), "Gibraltar"),
  (code(b'G', b'L'), "Greenland"),
  (code(b'G', b'M'), "Gambia"),
  (code(b'G', b'N'), "Guinea"),
  (code(b'G', b'P'), "Guadeloupe"),
  (code(b'G', b'Q'), "Equatorial Guinea"),
  (code(b'G', b'R'), "Greece"),
  (code(b'G', b'T'), "Guatemala"),
  (code(b'G', b'U'), "Guam"),
  (code(b'G', b'W'), "Guinea-Bissau"),
  (code(b'G', b'Y'), "Guyana"),
  (code(b'H', b'K'), "Hong Kong"),
  (code(b'H', b'N'), "Honduras"),
  (code(b'H', b'R'), "Croatia"),
  (code(b'H', b'T'), "Haiti"),
  (code(b'H', b'U'), "Hungary"),
  (code(b'I', b'D'), "Indonesia"),
  (code(b'I', b'E'), "Ireland"),
  (code(b'I', b'L'), "Israel"),
  (code(b'I', b'N'), "India"),
  (code(b'I', b'Q'), "Iraq"),
  (code(b'I', b'R'), "Iran"),
  (code(b'I', b'S'), "Iceland"),
  (code(b'I', b'T'), "Italy"),
  (code(b'J', b'M'), "Jamaica"),
  (code(b'J', b'O'), "Jordan"),
  (code(b'J', b'P'), "Japan"),
  (code(b'K', b'E'), "Kenya"),
  (code(b'K', b'G'), "Kyrgyzstan"),
  (code(b'K', b'H'), "Cambodia"),
  (code(b'K', b'I'), "Kiribati"),
  (code(b'K', b'M'), "Comoros"),
  (code(b'K', b'N'), "Saint Kitts and Nevis"),
  (code(b'K', b'P'), "Korea, North"),
  (code(b'K', b'R'), "Korea, South"),
  (code(b'K', b'W'), "Kuwait"),
  (code(b'K', b'Y'), "Cayman Islands"),
  (code(b'K', b'Z'), "Kazakhstan"),
  (code(b'L', b'A'), "Laos"),
  (code(b'L', b'B'), "Lebanon"),
  (code(b'L', b'C'), "Saint Lucia"),
  (code(b'L', b'I'), "Liechtenstein"),
  (code(b'L', b'K'), "Sri Lanka"),
  (code(b'L', b'R'), "Liberia"),
  (code(b'L', b'S'), "Lesotho"),
  (code(b'L', b'T'), "Lithuania"),
  (code(b'L', b'U'), "Luxembourg"),
  (code(b'L', b'V'), "Latvia"),
  (code(b'L', b'Y'), "Libya"),
  (code(b'M', b'A'), "Morocco"),
  (code(b'M', b'C'), "Monaco"),
  (code(b'M', b'D'), "Moldova"),
  (code(b'M', b'E'), "Montenegro"),
  (code(b'M', b'G'), "Madagascar"),
  (code(b'M', b'H'), "Marshall Islands"),
  (code(b'M', b'K'), "Macedonia"),
  (code(b'M', b'L'), "Mali"),
  (code(b'M', b'M'), "Myanmar"),
  (code(b'M', b'N'), "Mongolia"),
  (code(b'M', b'O'), "Macao"),
  (code(b'M', b'P'), "Northern Mariana Islands"),
  (code(b'M', b'Q'), "Martinique"),
  (code(b'M', b'R'), "Mauritania"),
  (code(b'M', b'S'), "Montserrat"),
  (code(b'M', b'T'), "Malta"),
  (code(b'M', b'U'), "Mauritius"),
  (code(b'M', b'V'), "Maldives"),
  (code(b'M', b'W'), "Malawi"),
  (code(b'M', b'X'), "Mexico"),
  (code(b'M', b'Y'), "Malaysia"),
  (code(b'M', b'Z'), "Mozambique"),
  (code(b'N', b'A'), "Namibia"),
  (code(b'N', b'C'), "New Caledonia"),
  (code(b'N', b'E'), "Niger"),
  (code(b'N', b'F'), "Norfolk Island"),
  (code(b'N', b'G'), "Nigeria"),
  (code(b'N', b'I'), "Nicaragua"),
  (code(b'N', b'L'), "Netherlands"),
  (code(b'N', b'O'), "Norway"),
  (code(b'N', b'P'), "Nepal"),
  (code(b'N', b'R'), "Nauru"),
  (code(b'N', b'U'), "Niue"),
  (code(b'N', b'Z'), "New Zealand"),
  (code(b'O', b'M'), "Oman"),
  (code(b'P', b'A'), "Panama"),
  (code(b'P', b'E'), "Peru"),
  (code(b'P', b'F'), "French Polynesia"),
  (code(b'P', b'G'), "Papua New Guinea"),
  (code(b'P', b'H'), "Philippines"),
  (code(b'P', b'K'), "Pakistan"),
  (code(b'P', b'L'), "Poland"),
  (code(b'P', b'M'), "Saint Pierre and Miquelon"),
  (code(b'P', b'R'), "Puerto Rico"),
  (code(b'P', b'T'), "Portugal"),
  (code(b'P', b'W'), "Palau"),
  (code(b'P', b'Y'), "Paraguay"),
  (code(b'Q', b'A'), "Qatar"),
  (code(b'R', b'E'), "Reunion"),
  (code(b'R', b'O'), "Romania"),
  (code(b'R', b'S'), "Serbia"),
  (code(b'R', b'U'), "Russia"),
  (code(b'R', b'W'), "Rwanda"),
  (code(b'S', b'A'), "Saudi Arabia"),
  (code(b'S', b'B'), "Solomon Islands"),
  (code(b'S', b'C'), "Seychelles"),
  (code(b'S', b'D'), "Sudan"),
  (code(b'S', b'E'), "Sweden"),
  (code(b'S', b'G'), "Singapore"),
  (code(b'S', b'I'), "Slovenia"),
  (code(b'S', b'K'), "Slovakia"),
  (code(b'S', b'L'), "Sierra Leone"),
  (code(b'S', b'M'), "San Marino"),
  (code(b'S', b'N'), "Senegal"),
  (code(b'S', b'O'), "Somalia"),
  (code(b'S', b'R'), "Suriname"),
  (code(b'S', b'T'), "Sao Tome and Principe"),
  (code(b'S', b'V'), "El Salvador"),
  (code(b'S', b'Y'), "Syria"),
  (code(b'S', b'Z'), "Swaziland"),
  (code(b'T', b'C'), "Turks and Caicos Islands"),
  (code(b'T', b'D'), "Chad"),
  (code(b'T', b'G'), "Togo"),
  (code(b'T', b'H'), "Thailand"),
  (code(b'T', b'J'), "Tajikistan"),
  (code(b'T', b'K'), "Tokelau"),
  (code(b'T', b'L'), "Timor-Leste"),
  (code(b'T', b'M'), "Turkmenistan"),
  (code(b'T', b'N'), "Tunisia"),
  (code(b'T', b'O'), "Tonga"),
  (code(b'T', b'R'), "Turkey"),
  (code(b'T', b'T'), "Trinidad and Tobago"),
  (code(b'T', b'V'), "Tuvalu"),
  (code(b'T', b'W'), "Taiwan"),
  (code(b'T', b'Z'), "Tanzania"),
  (code(b'U', b'A'), "Ukraine"),
  (code(b'U', b'G'), "Uganda"),
  (code(b'U', b'S'), "United States"),
  (code(b'U', b'Y'), "Uruguay"),
  (code(b'U', b'Z'), "Uzbekistan"),
  (code(b'V', b'A'), "Vatican City"),
  (code(b'V', b'C'), "Saint Vincent and the Grenadines"),
  (code(b'V', b'E'), "Venezuela"),
  (code(b'V', b'G'), "Virgin Islands, British"),
  (code(b'V', b'I'), "Virgin Islands, U.S."),
  (code(b'V', b'N'), "Vietnam"),
  (code(b'V', b'U'), "Vanuatu"),
  (code(b'W', b'F'), "Wallis and Futuna"),
  (code(b'W', b'S'), "Samoa"),
  (code(b'Y', b'E'), "Yemen"),
  (code(b'Y', b'T'), "Mayotte"),
  (code(b'Z', b'A'), "South Africa"),
  (code(b'Z', b'M'), "Zambia"),
  (code(b'Z', b'W'), "Zimbabwe"),
];

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lookup_by_code() {
    assert_eq!(country_name(code(b'D', b'E')), Some("Germany"));
    assert_eq!(country_name(code(b'U', b'S')), Some("United States"));
    assert_eq!(country_name(code(b'X', b'X')), None);
  }

  #[test]
  fn table_is_sorted() {
    for pair in COUNTRY_NAMES.windows(2) {
      assert!(pair[0].0 < pair[1].0);
    }
  }

  #[test]
  fn chars_round_trip() {
    let (a, b) = code_chars(code(b'S', b'E'));
    assert_eq!((a, b), ('S', 'E'));
  }
}

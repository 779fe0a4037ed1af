pub fn suffix(num: u32) -> &'static str {
    let s = num.to_string();
    if s.ends_with('1') && !s.ends_with("11") {
        "st"
    } else if s.ends_with('2') && !s.ends_with("12") {
        "nd"
    } else if s.ends_with('3') && !s.ends_with("13") {
        "rd"
    } else {
        "th"
    }
}

/// "1st", "22nd", ... Rank 0 (not ranked yet) shows as "-".
pub fn format_rank(rank: u32) -> String {
    match rank {
        0 => "-".to_string(),
        r => format!("{}{}", r, suffix(r)),
    }
}

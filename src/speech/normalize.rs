//! Text clean-up before synthesis
//!
//! Replies carry emoji and clock times that VITS voices read badly. This
//! turns them into plain words.

/// Whole-word abbreviations and their spoken form
const ABBREVIATIONS: [(&str, &str); 10] = [
    ("Mr.", "Mister"),
    ("Mrs.", "Misses"),
    ("Dr.", "Doctor"),
    ("vs.", "versus"),
    ("etc.", "etcetera"),
    ("e.g.", "for example"),
    ("i.e.", "that is"),
    ("approx.", "approximately"),
    ("AI", "A I"),
    ("API", "A P I"),
];

/// Normalize text for TTS synthesis
pub fn normalize_text_for_tts(text: &str) -> String {
    let mut result = text
        .split_whitespace()
        .map(|word| {
            let (core, trailing) = split_trailing_punctuation(word);
            match ABBREVIATIONS.iter().find(|(abbrev, _)| *abbrev == core) {
                Some((_, spoken)) => format!("{}{}", spoken, trailing),
                None => word.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    result = result.replace('&', " and ");
    result = result.replace('%', " percent");
    result = result.replace('@', " at ");
    result = result.replace('+', " plus ");

    result = expand_clock_times(&result);

    // Drops emoji and other symbols
    result = result
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || ".,!?;:'-\"".contains(*c))
        .collect();

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "AI!" -> ("AI", "!"); abbreviations keep their own dots
fn split_trailing_punctuation(word: &str) -> (&str, &str) {
    let core = word.trim_end_matches(|c: char| ",!?;:".contains(c));
    (core, &word[core.len()..])
}

/// "3:07:09" -> "three oh seven", "10:00" -> "ten o'clock". Seconds are
/// not spoken.
fn expand_clock_times(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            result.push(chars[i]);
            i += 1;
            continue;
        }

        let hours_end = scan_digits(&chars, i);
        let hours: String = chars[i..hours_end].iter().collect();

        let is_clock = hours.len() <= 2
            && chars.get(hours_end) == Some(&':')
            && scan_digits(&chars, hours_end + 1) == hours_end + 3;

        if !is_clock {
            result.push_str(&hours);
            i = hours_end;
            continue;
        }

        let minutes: String = chars[hours_end + 1..hours_end + 3].iter().collect();
        i = hours_end + 3;

        // Optional seconds
        if chars.get(i) == Some(&':') && scan_digits(&chars, i + 1) == i + 3 {
            i += 3;
        }

        result.push_str(&number_to_words(&hours));
        result.push(' ');
        result.push_str(&spoken_minutes(&minutes));
    }

    result
}

fn scan_digits(chars: &[char], start: usize) -> usize {
    let mut end = start;
    while end < chars.len() && chars[end].is_ascii_digit() {
        end += 1;
    }
    end
}

fn spoken_minutes(minutes: &str) -> String {
    match minutes.parse::<u32>() {
        Ok(0) => "o'clock".to_string(),
        Ok(m) if m < 10 => format!("oh {}", number_to_words(&m.to_string())),
        _ => number_to_words(minutes),
    }
}

/// Convert a number string to words (0 to 999)
fn number_to_words(num_str: &str) -> String {
    let num: u32 = match num_str.parse() {
        Ok(n) => n,
        Err(_) => return num_str.to_string(),
    };

    let ones = [
        "", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen",
        "eighteen", "nineteen",
    ];

    let tens = [
        "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
    ];

    match num {
        0 => "zero".to_string(),
        1..=19 => ones[num as usize].to_string(),
        20..=99 => {
            let t = (num / 10) as usize;
            let o = (num % 10) as usize;
            if o == 0 {
                tens[t].to_string()
            } else {
                format!("{}-{}", tens[t], ones[o])
            }
        }
        100..=999 => {
            let h = (num / 100) as usize;
            let rem = num % 100;
            if rem == 0 {
                format!("{} hundred", ones[h])
            } else {
                format!("{} hundred {}", ones[h], number_to_words(&rem.to_string()))
            }
        }
        _ => num_str.to_string(),
    }
}

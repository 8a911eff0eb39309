//! Bidi conformance in the `BidiTest.txt` and `BidiCharacterTest.txt`
//! formats.
//!
//! A small excerpt is always checked.  Point `NEOMACS_BIDI_TEST_DIR` at a
//! directory holding the Unicode data files to run the full corpora.

use std::path::PathBuf;

use neomacs_text::core::bidi::{reorder_visual, BidiClass, BidiData, BidiDir, BidiResolver, BracketType};

const BIDI_TEST_EXCERPT: &str = "\
# Class sequences; bitset: 1 = auto, 2 = LTR, 4 = RTL
@Levels: 0
@Reorder: 0
L; 3

@Levels: 1
@Reorder: 0
R; 5
AL; 5

@Levels: 2
@Reorder: 0
L; 4
EN; 4

@Levels: 1 1
@Reorder: 1 0
R R; 7

@Levels: 0 1
@Reorder: 0 1
L R; 3

@Levels: 2 1
@Reorder: 1 0
L R; 4

@Levels: 1 2
@Reorder: 1 0
R EN; 7
AL EN; 7

@Levels: 1 0
@Reorder: 0 1
R WS; 2

@Levels: 0 0 1
@Reorder: 0 1 2
L ON R; 3

@Levels: 1 1 1
@Reorder: 2 1 0
R ON R; 7

@Levels: x 2 x
@Reorder: 1
LRE L PDF; 3

@Levels: 0 0 1 0 0
@Reorder: 0 1 2 3 4
L RLI R PDI L; 3
";

const CHARACTER_TEST_EXCERPT: &str = "\
# code points; direction; paragraph level; levels; visual order
05D0 0028 0062 0029 0063;1;1;1 1 2 1 2;4 3 2 1 0
0061 0028 0062 0029 0063;1;1;2 2 2 2 2;0 1 2 3 4
0061 0020 05D0;2;0;0 0 1;0 1 2
05D0 0020 0031 0032;2;1;1 1 2 2;2 3 1 0
";

#[derive(Debug, Default)]
struct Outcome {
    passed: usize,
    failures: Vec<String>,
}

impl Outcome {
    fn check(&mut self, ok: bool, describe: impl FnOnce() -> String) {
        if ok {
            self.passed += 1;
        } else {
            self.failures.push(describe());
        }
    }

    fn assert_clean(&self, what: &str) {
        assert!(
            self.failures.is_empty(),
            "{}: {} passed, {} failed; first failures:\n{}",
            what,
            self.passed,
            self.failures.len(),
            self.failures.iter().take(10).cloned().collect::<Vec<_>>().join("\n")
        );
    }
}

/// Expected levels; `None` marks a code point removed by X9.
fn parse_levels(field: &str) -> Vec<Option<u8>> {
    field
        .split_whitespace()
        .map(|l| if l == "x" { None } else { l.parse().ok() })
        .collect()
}

fn parse_indices(field: &str) -> Vec<usize> {
    field.split_whitespace().filter_map(|i| i.parse().ok()).collect()
}

/// Visual order of the code points that survive X9.
fn visual_order(levels: &[u8], expected: &[Option<u8>]) -> Vec<usize> {
    let kept: Vec<usize> = (0..levels.len()).filter(|&i| expected[i].is_some()).collect();
    let kept_levels: Vec<u8> = kept.iter().map(|&i| levels[i]).collect();
    reorder_visual(&kept_levels).into_iter().map(|k| kept[k]).collect()
}

fn levels_match(actual: &[u8], expected: &[Option<u8>]) -> bool {
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected)
            .all(|(&a, e)| e.map_or(true, |e| e == a))
}

fn run_bidi_test(content: &str) -> Outcome {
    let mut outcome = Outcome::default();
    let mut resolver = BidiResolver::new();
    let mut expected_levels: Vec<Option<u8>> = Vec::new();
    let mut expected_order: Vec<usize> = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("@Levels:") {
            expected_levels = parse_levels(rest);
            continue;
        }
        if let Some(rest) = line.strip_prefix("@Reorder:") {
            expected_order = parse_indices(rest);
            continue;
        }
        if line.starts_with('@') {
            continue;
        }
        let Some((classes, bitset)) = line.split_once(';') else {
            continue;
        };
        let types: Vec<BidiClass> = classes
            .split_whitespace()
            .map(|c| BidiClass::from_alias(c).unwrap_or_else(|| panic!("unknown class {} on line {}", c, line_no + 1)))
            .collect();
        let bitset: u32 = bitset.trim().parse().unwrap();
        let brackets = vec![BracketType::None; types.len()];
        let values = vec![0u32; types.len()];

        for (bit, direction) in [(1, BidiDir::Auto), (2, BidiDir::LTR), (4, BidiDir::RTL)] {
            if bitset & bit == 0 {
                continue;
            }
            let mut levels = vec![0u8; types.len()];
            let resolved = resolver.resolve(&types, &brackets, &values, direction, &mut levels);
            let ok = resolved.is_ok()
                && levels_match(&levels, &expected_levels)
                && visual_order(&levels, &expected_levels) == expected_order;
            outcome.check(ok, || {
                format!(
                    "line {}: {} ({:?}): levels {:?}, expected {:?} / order {:?}",
                    line_no + 1,
                    classes,
                    direction,
                    levels,
                    expected_levels,
                    expected_order
                )
            });
        }
    }
    outcome
}

fn run_character_test(content: &str) -> Outcome {
    let mut outcome = Outcome::default();
    let mut resolver = BidiResolver::new();
    let mut data = BidiData::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(';').collect();
        if fields.len() < 5 {
            continue;
        }
        let chars: Vec<char> = fields[0]
            .split_whitespace()
            .map(|h| u32::from_str_radix(h, 16).ok().and_then(char::from_u32).unwrap_or('\u{FFFD}'))
            .collect();
        let direction = match fields[1].trim() {
            "0" => BidiDir::LTR,
            "1" => BidiDir::RTL,
            _ => BidiDir::Auto,
        };
        let paragraph: u8 = fields[2].trim().parse().unwrap();
        let expected_levels = parse_levels(fields[3]);
        let expected_order = parse_indices(fields[4]);

        data.init(&chars);
        let mut levels = vec![0u8; chars.len()];
        let resolved = resolver.resolve(
            data.types(),
            data.bracket_types(),
            data.bracket_values(),
            direction,
            &mut levels,
        );
        let ok = resolved.as_ref().ok() == Some(&paragraph)
            && levels_match(&levels, &expected_levels)
            && visual_order(&levels, &expected_levels) == expected_order;
        outcome.check(ok, || {
            format!(
                "line {}: {} dir {:?}: paragraph {:?}, levels {:?}, expected {} {:?}",
                line_no + 1,
                fields[0],
                direction,
                resolved,
                levels,
                paragraph,
                expected_levels
            )
        });
    }
    outcome
}

fn corpus(file: &str) -> Option<String> {
    let dir = std::env::var_os("NEOMACS_BIDI_TEST_DIR")?;
    let path = PathBuf::from(dir).join(file);
    match std::fs::read_to_string(&path) {
        Ok(content) => Some(content),
        Err(err) => panic!("cannot read {}: {}", path.display(), err),
    }
}

#[test]
fn bidi_test_excerpt() {
    let outcome = run_bidi_test(BIDI_TEST_EXCERPT);
    outcome.assert_clean("BidiTest excerpt");
    assert_eq!(outcome.passed, 30);
}

#[test]
fn bidi_character_test_excerpt() {
    let outcome = run_character_test(CHARACTER_TEST_EXCERPT);
    outcome.assert_clean("BidiCharacterTest excerpt");
    assert_eq!(outcome.passed, 4);
}

#[test]
fn bidi_test_full_corpus() {
    let Some(content) = corpus("BidiTest.txt") else {
        return;
    };
    run_bidi_test(&content).assert_clean("BidiTest.txt");
}

#[test]
fn bidi_character_test_full_corpus() {
    let Some(content) = corpus("BidiCharacterTest.txt") else {
        return;
    };
    run_character_test(&content).assert_clean("BidiCharacterTest.txt");
}

use serde::Serialize;

/// Count of one category, with a per-platform split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
    /// Raw platform code -> count, in first-seen order.
    pub by_platform: Vec<(String, usize)>,
}

/// Group `(label, platform)` pairs and sort descending by count.
///
/// Categories with equal counts keep first-seen order.
pub fn group_counts<I>(items: I, unknown: &str) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = (String, Option<String>)>,
{
    let mut groups: Vec<CategoryCount> = Vec::new();
    for (label, platform) in items {
        let platform = platform.unwrap_or_else(|| unknown.to_string());
        let group = match groups.iter().position(|g| g.label == label) {
            Some(i) => &mut groups[i],
            None => {
                groups.push(CategoryCount {
                    label,
                    count: 0,
                    by_platform: Vec::new(),
                });
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };
        group.count += 1;
        match group.by_platform.iter_mut().find(|(p, _)| *p == platform) {
            Some((_, n)) => *n += 1,
            None => group.by_platform.push((platform, 1)),
        }
    }
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

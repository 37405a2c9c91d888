// Unique automation name picking.
//
// Picks uniformly among the pool names that are not already taken. When every
// name in the pool is taken, a base name is picked uniformly and given the
// smallest ordinal suffix (" II", " III", ...) that is free, so buying more
// automations than the pool holds still terminates with a unique name.
//
// The caller supplies `is_taken`; the sim backs it with its name registry.

use crate::{NameCategory, NamePool};
use idle_garden_prng::GameRng;

/// Pick a name for a new automation of `category` that `is_taken` rejects.
pub fn pick_unique_name(
    pool: &NamePool,
    category: NameCategory,
    rng: &mut GameRng,
    is_taken: impl Fn(&str) -> bool,
) -> String {
    let names = pool.names(category);
    let free: Vec<&String> = names.iter().filter(|n| !is_taken(n)).collect();

    if let Some(idx) = rng.pick_index(free.len()) {
        return free[idx].clone();
    }

    let base = match rng.pick_index(names.len()) {
        Some(idx) => names[idx].clone(),
        None => fallback_base(category).to_string(),
    };
    if !is_taken(&base) {
        return base;
    }
    (2u32..)
        .map(|n| format!("{base} {}", roman(n)))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or(base)
}

fn fallback_base(category: NameCategory) -> &'static str {
    match category {
        NameCategory::Harvester => "Harvester",
        NameCategory::Planter => "Planter",
        NameCategory::Seller => "Seller",
    }
}

/// Roman numeral for a positive ordinal.
fn roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for &(value, glyph) in &TABLE {
        while n >= value {
            out.push_str(glyph);
            n -= value;
        }
    }
    out
}

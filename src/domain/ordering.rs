//! Index bookkeeping shared by columns and cards.
//!
//! Both entities keep a zero-based `index` among their siblings. A "scope" is the set of
//! siblings: the cards of one column, or the columns of one board. Every mutation must
//! leave each scope holding exactly `0..n`.

/// An entity with a position among its siblings
pub trait Positioned {
    fn index(&self) -> u32;
    fn set_index(&mut self, index: u32);
}

/// Returns the index a new entity appended to a scope should receive
///
/// This is one past the largest index in use, or 0 when the scope is empty.
pub fn next_index<'a, T, I>(scope: I) -> u32
where
    T: Positioned + 'a,
    I: IntoIterator<Item = &'a T>,
{
    scope
        .into_iter()
        .map(|item| item.index())
        .max()
        .map_or(0, |max| max + 1)
}

/// Rewrites the indices of every item selected by `in_scope` to `0..n`
///
/// Relative order is kept (ties broken by position in `items`). Only items whose index
/// actually changes are written. Returns the number of items rewritten.
pub fn compact<T, F>(items: &mut [T], in_scope: F) -> usize
where
    T: Positioned,
    F: Fn(&T) -> bool,
{
    let mut slots: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| in_scope(item))
        .map(|(slot, _)| slot)
        .collect();
    slots.sort_by_key(|&slot| items[slot].index());

    let mut rewritten = 0;
    for (position, slot) in slots.into_iter().enumerate() {
        let position = position as u32;
        if items[slot].index() != position {
            items[slot].set_index(position);
            rewritten += 1;
        }
    }
    rewritten
}

/// Checks that the indices of the selected items are exactly `0..n`
pub fn is_contiguous<'a, T, I>(scope: I) -> bool
where
    T: Positioned + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut indices: Vec<u32> = scope.into_iter().map(|item| item.index()).collect();
    indices.sort_unstable();
    indices
        .iter()
        .enumerate()
        .all(|(position, &index)| index == position as u32)
}

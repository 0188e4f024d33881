use crate::{
    core::geo::ScreenPoint,
    input::handler::EventManager,
    overlays::{
        base::{FrameContext, HitResult, OverlayEntry, OverlayKind, Rank},
        standard::{Compass, LocationIndicator},
    },
    rendering::context::RenderContext,
};

/// Ordered overlay entries, painted bottom-up and hit-tested top-down.
///
/// Every appended entry gets the next rank. Ranks are permanent identifiers:
/// removing an entry never renumbers the others.
#[derive(Debug, Default)]
pub struct OverlayStack {
    /// Sorted by rank; ranks only grow so `append` is a push
    entries: Vec<(Rank, OverlayEntry)>,
    next_rank: u32,
}

impl OverlayStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry on top of the stack and returns its rank
    pub fn append(&mut self, entry: OverlayEntry) -> Rank {
        let rank = Rank::new(self.next_rank);
        self.next_rank += 1;
        log::debug!("overlay {} appended at rank {}", entry.kind(), rank);
        self.entries.push((rank, entry));
        rank
    }

    /// Removes the entry at `rank`.
    ///
    /// Absent ranks are ignored. Standard overlays live for the whole session
    /// and are refused.
    pub fn remove(&mut self, rank: Rank) -> Option<OverlayEntry> {
        let index = self.index_of(rank)?;
        if self.entries[index].1.is_standard() {
            log::warn!(
                "refusing to remove standard overlay {} at rank {}",
                self.entries[index].1.kind(),
                rank
            );
            return None;
        }
        let (_, entry) = self.entries.remove(index);
        log::debug!("overlay {} removed from rank {}", entry.kind(), rank);
        Some(entry)
    }

    pub fn get(&self, rank: Rank) -> Option<&OverlayEntry> {
        self.index_of(rank).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, rank: Rank) -> Option<&mut OverlayEntry> {
        self.index_of(rank).map(move |i| &mut self.entries[i].1)
    }

    /// Rank of the lowest entry of `kind`
    pub fn find(&self, kind: OverlayKind) -> Option<Rank> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.kind() == kind)
            .map(|(rank, _)| *rank)
    }

    pub fn location_indicator(&self) -> Option<&LocationIndicator> {
        self.entries.iter().find_map(|(_, entry)| match entry {
            OverlayEntry::LocationIndicator(o) => Some(o),
            _ => None,
        })
    }

    pub fn location_indicator_mut(&mut self) -> Option<&mut LocationIndicator> {
        self.entries.iter_mut().find_map(|(_, entry)| match entry {
            OverlayEntry::LocationIndicator(o) => Some(o),
            _ => None,
        })
    }

    pub fn compass_mut(&mut self) -> Option<&mut Compass> {
        self.entries.iter_mut().find_map(|(_, entry)| match entry {
            OverlayEntry::Compass(o) => Some(o),
            _ => None,
        })
    }

    /// Entries bottom to top
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Rank, &OverlayEntry)> + '_ {
        self.entries.iter().map(|(rank, entry)| (*rank, entry))
    }

    /// Ranks in paint order (ascending)
    pub fn render_order(&self) -> Vec<Rank> {
        self.iter().map(|(rank, _)| rank).collect()
    }

    /// Ranks in hit-test order (descending)
    pub fn hit_order(&self) -> Vec<Rank> {
        self.iter().rev().map(|(rank, _)| rank).collect()
    }

    /// Paints enabled entries in ascending rank order
    pub fn render(&self, frame: &FrameContext<'_>, context: &mut RenderContext) {
        for (rank, entry) in self.iter() {
            let overlay = entry.overlay();
            if overlay.is_enabled() {
                overlay.render(rank, frame, context);
            }
        }
    }

    /// Offers a tap to enabled entries from the top down.
    ///
    /// Stops at the first entry that consumes it and returns `true`; returns
    /// `false` when every entry let it pass.
    pub fn dispatch_click(
        &self,
        point: ScreenPoint,
        frame: &FrameContext<'_>,
        events: &mut EventManager,
    ) -> bool {
        for (rank, entry) in self.iter().rev() {
            let overlay = entry.overlay();
            if !overlay.is_enabled() {
                continue;
            }
            if overlay.hit_test(rank, point, frame, events) == HitResult::Consumed {
                log::debug!("tap consumed by {} at rank {}", entry.kind(), rank);
                return true;
            }
        }
        false
    }

    /// Topmost entry willing to handle a rotation gesture
    pub fn rotation_handler(&self) -> Option<Rank> {
        self.iter()
            .rev()
            .find(|(_, entry)| entry.overlay().handles_rotation())
            .map(|(rank, _)| rank)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn index_of(&self, rank: Rank) -> Option<usize> {
        self.entries.binary_search_by_key(&rank, |(r, _)| *r).ok()
    }
}

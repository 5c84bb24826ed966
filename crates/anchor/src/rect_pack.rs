//! Skyline rectangle packer used by the font atlas builder.
//!
//! The packed area keeps a "skyline": the top edge of everything placed so far,
//! stored as horizontal segments from left to right. Each rectangle goes where its
//! bottom edge lands lowest (bottom-left rule), ties broken by the least wasted area
//! under it. Rectangles are packed tallest first; results are written back in the
//! caller's order.

/// A rectangle to be placed. `x`/`y` are only meaningful when `was_packed` is set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PackRect {
    pub w: u32,
    pub h: u32,
    pub x: u32,
    pub y: u32,
    pub was_packed: bool,
}

impl PackRect {
    pub const fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            x: 0,
            y: 0,
            was_packed: false,
        }
    }
}

/// One horizontal run of the skyline.
#[derive(Copy, Clone, Debug)]
struct Segment {
    x: u32,
    y: u32,
    w: u32,
}

pub struct SkylinePacker {
    width: u32,
    height: u32,
    skyline: Vec<Segment>,
}

impl SkylinePacker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            skyline: vec![Segment { x: 0, y: 0, w: width }],
        }
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Highest point of the skyline.
    pub fn used_height(&self) -> u32 {
        self.skyline.iter().map(|s| s.y).max().unwrap_or(0)
    }

    /// Place every rectangle that fits. Zero-sized rectangles are "packed" at the origin.
    ///
    /// Returns `true` when all of them were placed.
    pub fn pack(&mut self, rects: &mut [PackRect]) -> bool {
        let mut order: Vec<usize> = (0..rects.len()).collect();
        order.sort_by(|&a, &b| {
            rects[b]
                .h
                .cmp(&rects[a].h)
                .then_with(|| rects[b].w.cmp(&rects[a].w))
        });

        let mut all_packed = true;
        for i in order {
            let r = &mut rects[i];
            if r.w == 0 || r.h == 0 {
                r.x = 0;
                r.y = 0;
                r.was_packed = true;
                continue;
            }
            match self.find_position(r.w, r.h) {
                Some((idx, x, y)) => {
                    self.add_level(idx, x, y + r.h, r.w);
                    r.x = x;
                    r.y = y;
                    r.was_packed = true;
                }
                None => {
                    r.was_packed = false;
                    all_packed = false;
                }
            }
        }
        all_packed
    }

    /// Lowest placement for a `w`x`h` rect: `(first segment index, x, y)`.
    fn find_position(&self, w: u32, h: u32) -> Option<(usize, u32, u32)> {
        if w > self.width || h > self.height {
            return None;
        }

        let mut best: Option<(usize, u32, u32)> = None;
        let mut best_waste = u64::MAX;
        for start in 0..self.skyline.len() {
            let x = self.skyline[start].x;
            if x + w > self.width {
                break;
            }

            // Resting height is the tallest segment under [x, x + w).
            let mut y = 0;
            let mut covered = 0;
            let mut i = start;
            while covered < w {
                let seg = self.skyline[i];
                y = y.max(seg.y);
                covered += seg.w.min(w - covered);
                i += 1;
            }
            if y + h > self.height {
                continue;
            }

            let mut waste = 0u64;
            let mut covered = 0;
            let mut i = start;
            while covered < w {
                let seg = self.skyline[i];
                let span = seg.w.min(w - covered);
                waste += u64::from(y - seg.y) * u64::from(span);
                covered += span;
                i += 1;
            }

            let better = match best {
                None => true,
                Some((_, _, best_y)) => y < best_y || (y == best_y && waste < best_waste),
            };
            if better {
                best = Some((start, x, y));
                best_waste = waste;
            }
        }
        best
    }

    /// Raise the skyline to `top` over `[x, x + w)`, starting at segment `idx`.
    fn add_level(&mut self, idx: usize, x: u32, top: u32, w: u32) {
        let end = x + w;
        self.skyline.insert(idx, Segment { x, y: top, w });

        // Trim or drop the segments now hidden under the new one.
        let i = idx + 1;
        while i < self.skyline.len() {
            let seg = self.skyline[i];
            if seg.x >= end {
                break;
            }
            let seg_end = seg.x + seg.w;
            if seg_end <= end {
                self.skyline.remove(i);
            } else {
                self.skyline[i] = Segment {
                    x: end,
                    y: seg.y,
                    w: seg_end - end,
                };
                break;
            }
        }

        // Merge neighbours at the same height.
        let mut j = 0;
        while j + 1 < self.skyline.len() {
            if self.skyline[j].y == self.skyline[j + 1].y {
                self.skyline[j].w += self.skyline[j + 1].w;
                self.skyline.remove(j + 1);
            } else {
                j += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn overlaps(a: &PackRect, b: &PackRect) -> bool {
        a.x < b.x + b.w && b.x < a.x + a.w && a.y < b.y + b.h && b.y < a.y + a.h
    }

    #[test]
    fn test_first_rect_goes_to_origin() {
        let mut packer = SkylinePacker::new(64, 64);
        let mut rects = [PackRect::new(10, 20)];
        assert!(packer.pack(&mut rects));
        assert_eq!((rects[0].x, rects[0].y), (0, 0));
        assert_eq!(packer.used_height(), 20);
    }

    #[test]
    fn test_rows_fill_left_to_right() {
        let mut packer = SkylinePacker::new(30, 100);
        let mut rects = [PackRect::new(10, 10), PackRect::new(10, 10), PackRect::new(10, 10)];
        assert!(packer.pack(&mut rects));
        let mut xs: Vec<u32> = rects.iter().map(|r| r.x).collect();
        xs.sort_unstable();
        assert_eq!(xs, vec![0, 10, 20]);
        assert!(rects.iter().all(|r| r.y == 0));
    }

    #[test]
    fn test_too_wide_is_not_packed() {
        let mut packer = SkylinePacker::new(16, 16);
        let mut rects = [PackRect::new(17, 1), PackRect::new(4, 4)];
        assert!(!packer.pack(&mut rects));
        assert!(!rects[0].was_packed);
        assert!(rects[1].was_packed);
    }

    #[test]
    fn test_fills_gap_beside_tall_rect() {
        let mut packer = SkylinePacker::new(20, 100);
        let mut rects = [PackRect::new(10, 30), PackRect::new(10, 10), PackRect::new(10, 10)];
        assert!(packer.pack(&mut rects));
        // Both short rects stack in the column next to the tall one.
        assert_eq!(rects[1].x, 10);
        assert_eq!(rects[2].x, 10);
        assert_eq!(packer.used_height(), 30);
    }

    proptest! {
        #[test]
        fn prop_packed_rects_are_disjoint_and_in_bounds(
            sizes in prop::collection::vec((1u32..40, 1u32..40), 1..60)
        ) {
            let mut packer = SkylinePacker::new(128, 4096);
            let mut rects: Vec<PackRect> = sizes.iter().map(|&(w, h)| PackRect::new(w, h)).collect();
            prop_assert!(packer.pack(&mut rects));
            for (i, a) in rects.iter().enumerate() {
                prop_assert!(a.x + a.w <= 128);
                prop_assert!(a.y + a.h <= packer.used_height());
                for b in &rects[i + 1..] {
                    prop_assert!(!overlaps(a, b));
                }
            }
        }
    }
}

//! Out-of-order recording into a draw list.
//!
//! Each channel owns its own command and index buffers; vertices are shared. The
//! draw list always holds the buffers of the current channel, the splitter keeps
//! the others. Merging concatenates channels in index order.

use std::mem;

use crate::draw_cmd::DrawCmd;
use crate::draw_list::DrawList;
use crate::vertex::DrawIdx;

#[derive(Debug, Default, Clone)]
pub struct DrawChannel {
    pub cmd_buffer: Vec<DrawCmd>,
    pub idx_buffer: Vec<DrawIdx>,
}

/// Split a [`DrawList`] into layers, e.g. to draw backgrounds after the content.
#[derive(Debug, Default)]
pub struct ChannelSplitter {
    current: usize,
    count: usize,
    channels: Vec<DrawChannel>,
}

impl ChannelSplitter {
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Forget the split without releasing channel memory.
    pub fn clear(&mut self) {
        self.current = 0;
        self.count = 1;
    }

    pub fn clear_free_memory(&mut self) {
        self.channels = Vec::new();
        self.current = 0;
        self.count = 1;
    }

    /// Split into `count` channels. Channel 0 keeps what was already recorded.
    pub fn split(&mut self, draw_list: &mut DrawList, count: usize) {
        debug_assert!(
            self.current == 0 && self.count <= 1,
            "nested channel splitting is not supported, use a separate splitter"
        );
        if self.channels.len() < count {
            self.channels.resize_with(count, DrawChannel::default);
        }
        self.count = count;

        // Channel 0 lives in the draw list; its slot stays empty until swapped out.
        if let Some(first) = self.channels.first_mut() {
            first.cmd_buffer.clear();
            first.idx_buffer.clear();
        }
        let header = draw_list.cmd_header;
        let idx_offset = 0;
        for channel in self.channels.iter_mut().take(count).skip(1) {
            channel.cmd_buffer.clear();
            channel.idx_buffer.clear();
            channel.cmd_buffer.push(DrawCmd::from_header(header, idx_offset));
        }
    }

    /// Route further drawing into channel `idx`.
    pub fn set_current_channel(&mut self, draw_list: &mut DrawList, idx: usize) {
        debug_assert!(idx < self.count, "channel {idx} out of range (count {})", self.count);
        if self.current == idx || idx >= self.count {
            return;
        }

        self.swap_with_list(draw_list, self.current);
        self.current = idx;
        self.swap_with_list(draw_list, idx);
        draw_list.idx_write = draw_list.idx_buffer.len();

        // Carry the list's current clip rect and texture into the channel.
        let header = draw_list.cmd_header;
        match draw_list.cmd_buffer.last_mut() {
            None => draw_list.add_draw_cmd(),
            Some(cmd) if cmd.elem_count == 0 && cmd.user_callback.is_none() => cmd.set_header(&header),
            Some(cmd) if !cmd.header_eq(&header) => draw_list.add_draw_cmd(),
            Some(_) => {}
        }
    }

    fn swap_with_list(&mut self, draw_list: &mut DrawList, idx: usize) {
        let channel = &mut self.channels[idx];
        mem::swap(&mut channel.cmd_buffer, &mut draw_list.cmd_buffer);
        mem::swap(&mut channel.idx_buffer, &mut draw_list.idx_buffer);
    }

    /// Concatenate every channel back into the draw list, in channel order.
    pub fn merge(&mut self, draw_list: &mut DrawList) {
        if self.count <= 1 {
            return;
        }

        self.set_current_channel(draw_list, 0);
        draw_list.pop_unused_draw_cmd();

        let mut idx_offset = draw_list
            .cmd_buffer
            .last()
            .map_or(0, |cmd| cmd.idx_offset + cmd.elem_count);

        for channel in self.channels.iter_mut().take(self.count).skip(1) {
            if matches!(channel.cmd_buffer.last(), Some(cmd) if cmd.elem_count == 0 && cmd.user_callback.is_none()) {
                channel.cmd_buffer.pop();
            }

            let mut cmds = channel.cmd_buffer.drain(..).peekable();
            if let (Some(last), Some(next)) = (draw_list.cmd_buffer.last_mut(), cmds.peek()) {
                if last.can_merge_with(next) {
                    last.elem_count += next.elem_count;
                    idx_offset += next.elem_count;
                    cmds.next();
                }
            }
            for mut cmd in cmds {
                cmd.idx_offset = idx_offset;
                idx_offset += cmd.elem_count;
                draw_list.cmd_buffer.push(cmd);
            }
            draw_list.idx_buffer.extend(channel.idx_buffer.drain(..));
        }
        draw_list.idx_write = draw_list.idx_buffer.len();

        // Leave a command matching the current header for whatever comes next.
        let header = draw_list.cmd_header;
        match draw_list.cmd_buffer.last_mut() {
            Some(cmd) if cmd.user_callback.is_none() && cmd.elem_count == 0 => cmd.set_header(&header),
            Some(cmd) if cmd.user_callback.is_none() && cmd.header_eq(&header) => {}
            _ => draw_list.add_draw_cmd(),
        }

        self.count = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::COL32_WHITE;
    use crate::flags::{DrawFlags, DrawListFlags};
    use crate::primitives::Vec2;
    use crate::shared::SharedData;
    use std::sync::Arc;

    fn list() -> DrawList {
        let mut data = SharedData::new();
        data.initial_flags = DrawListFlags::empty();
        DrawList::new(Arc::new(data))
    }

    fn rect(list: &mut DrawList, x: f32) {
        list.add_rect_filled(Vec2::new(x, 0.0), Vec2::new(x + 5.0, 5.0), COL32_WHITE, 0.0, DrawFlags::empty());
    }

    #[test]
    fn test_two_channels_merge_in_channel_order() {
        let mut list = list();
        list.channels_split(2);
        list.channels_set_current(1);
        rect(&mut list, 10.0);
        list.channels_set_current(0);
        rect(&mut list, 0.0);
        list.channels_merge();

        assert_eq!(list.cmd_buffer.len(), 1);
        assert_eq!(list.cmd_buffer[0].elem_count, 12);
        assert_eq!(list.idx_buffer.len(), 12);
        // Channel 0's rect comes first in the index stream.
        let first_vtx = list.idx_buffer[0] as usize;
        assert_eq!(list.vtx_buffer[first_vtx].pos().x, 0.0);
        let later_vtx = list.idx_buffer[6] as usize;
        assert_eq!(list.vtx_buffer[later_vtx].pos().x, 10.0);
    }

    #[test]
    fn test_merge_without_split_is_noop() {
        let mut list = list();
        rect(&mut list, 0.0);
        list.channels_merge();
        assert_eq!(list.cmd_buffer.len(), 1);
        assert_eq!(list.idx_buffer.len(), 6);
    }

    #[test]
    fn test_different_clip_rects_stay_separate() {
        let mut list = list();
        list.channels_split(2);
        list.channels_set_current(1);
        list.push_clip_rect(Vec2::ZERO, Vec2::new(50.0, 50.0), false);
        rect(&mut list, 10.0);
        list.pop_clip_rect();
        list.channels_set_current(0);
        rect(&mut list, 0.0);
        list.channels_merge();

        let drawn: Vec<u32> = list.cmd_buffer.iter().map(|c| c.elem_count).filter(|&n| n > 0).collect();
        assert_eq!(drawn, vec![6, 6]);
        let mut offset = 0;
        for cmd in &list.cmd_buffer {
            assert_eq!(cmd.idx_offset, offset);
            offset += cmd.elem_count;
        }
        assert_eq!(offset as usize, list.idx_buffer.len());
    }

    #[test]
    fn test_split_can_be_reused() {
        let mut list = list();
        for _ in 0..2 {
            list.channels_split(3);
            list.channels_set_current(2);
            rect(&mut list, 20.0);
            list.channels_set_current(1);
            rect(&mut list, 10.0);
            list.channels_merge();
        }
        assert_eq!(list.idx_buffer.len(), 24);
        assert_eq!(list.splitter.count(), 1);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn merge_keeps_every_index(draws in prop::collection::vec((0usize..4, any::<bool>()), 0..24)) {
                let mut list = list();
                list.channels_split(4);
                for (channel, clip) in &draws {
                    list.channels_set_current(*channel);
                    if *clip {
                        list.push_clip_rect(Vec2::ZERO, Vec2::splat(30.0), false);
                    }
                    rect(&mut list, *channel as f32 * 10.0);
                    if *clip {
                        list.pop_clip_rect();
                    }
                }
                list.channels_merge();

                prop_assert_eq!(list.idx_buffer.len(), draws.len() * 6);
                let mut offset = 0;
                for cmd in &list.cmd_buffer {
                    prop_assert_eq!(cmd.idx_offset, offset);
                    offset += cmd.elem_count;
                }
                prop_assert_eq!(offset as usize, list.idx_buffer.len());
                // Never more draw calls than channel/clip changes can explain.
                let drawn = list.cmd_buffer.iter().filter(|c| c.elem_count > 0).count();
                prop_assert!(drawn <= draws.len().max(1));
            }
        }
    }
}

//! Bit sets and index enums shared between the core and its callers.
//!
//! Bit positions match the values widget code has historically hard-coded, so
//! host backends that read them directly keep working.

use bitflags::bitflags;

bitflags! {
    /// Per-call drawing options for rects, paths and polylines.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DrawFlags: u32 {
        /// Polyline/path is closed (last point joins the first).
        const CLOSED = 1 << 0;
        const ROUND_CORNERS_TOP_LEFT = 1 << 4;
        const ROUND_CORNERS_TOP_RIGHT = 1 << 5;
        const ROUND_CORNERS_BOTTOM_LEFT = 1 << 6;
        const ROUND_CORNERS_BOTTOM_RIGHT = 1 << 7;
        /// Disable rounding even when `rounding > 0`.
        const ROUND_CORNERS_NONE = 1 << 8;
        const ROUND_CORNERS_TOP = Self::ROUND_CORNERS_TOP_LEFT.bits() | Self::ROUND_CORNERS_TOP_RIGHT.bits();
        const ROUND_CORNERS_BOTTOM = Self::ROUND_CORNERS_BOTTOM_LEFT.bits() | Self::ROUND_CORNERS_BOTTOM_RIGHT.bits();
        const ROUND_CORNERS_LEFT = Self::ROUND_CORNERS_BOTTOM_LEFT.bits() | Self::ROUND_CORNERS_TOP_LEFT.bits();
        const ROUND_CORNERS_RIGHT = Self::ROUND_CORNERS_BOTTOM_RIGHT.bits() | Self::ROUND_CORNERS_TOP_RIGHT.bits();
        const ROUND_CORNERS_ALL = Self::ROUND_CORNERS_TOP.bits() | Self::ROUND_CORNERS_BOTTOM.bits();
        const ROUND_CORNERS_MASK = Self::ROUND_CORNERS_ALL.bits() | Self::ROUND_CORNERS_NONE.bits();
    }
}

impl DrawFlags {
    /// Translate legacy corner values into `ROUND_CORNERS_*` bits.
    ///
    /// `!0` means every corner. `0x01..=0x0F` are the old top-left/top-right/
    /// bottom-left/bottom-right bits, shifted into their current positions. That
    /// range overlaps [`DrawFlags::CLOSED`], which is never valid for rects.
    /// With no corner bits at all, every corner is rounded.
    pub fn fix_rect_corner_flags(self) -> Self {
        let bits = self.bits();
        if bits == !0 {
            return Self::ROUND_CORNERS_ALL;
        }
        if (0x01..=0x0F).contains(&bits) {
            return Self::from_bits_retain(bits << 4);
        }
        debug_assert!(
            bits & 0x0F == 0,
            "misuse of legacy hard-coded corner flag values"
        );
        let mut flags = self;
        if !flags.intersects(Self::ROUND_CORNERS_MASK) {
            flags |= Self::ROUND_CORNERS_ALL;
        }
        flags
    }
}

bitflags! {
    /// Per draw-list tessellation switches, seeded from [`crate::SharedData`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DrawListFlags: u32 {
        /// Anti-aliased lines/borders (thin lines use a texture when possible).
        const ANTI_ALIASED_LINES = 1 << 0;
        /// Thin anti-aliased lines sample the baked line strips in the font atlas.
        const ANTI_ALIASED_LINES_USE_TEX = 1 << 1;
        /// Anti-aliased edges around filled shapes.
        const ANTI_ALIASED_FILL = 1 << 2;
        /// The renderer honors `DrawCmd::vtx_offset`, allowing meshes past 64k vertices with 16-bit indices.
        const ALLOW_VTX_OFFSET = 1 << 3;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FontAtlasFlags: u32 {
        /// Don't round the texture height up to the next power of two.
        const NO_POWER_OF_TWO_HEIGHT = 1 << 0;
        /// Don't bake mouse cursor art; a 2x2 white block is reserved instead.
        const NO_MOUSE_CURSORS = 1 << 1;
        /// Don't bake the anti-aliased line strips.
        const NO_BAKED_LINES = 1 << 2;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowFlags: u32 {
        const NO_TITLE_BAR = 1 << 0;
        const NO_RESIZE = 1 << 1;
        const NO_MOVE = 1 << 2;
        const NO_SCROLLBAR = 1 << 3;
        const NO_SCROLL_WITH_MOUSE = 1 << 4;
        const NO_COLLAPSE = 1 << 5;
        const ALWAYS_AUTO_RESIZE = 1 << 6;
        const NO_BACKGROUND = 1 << 7;
        /// Never load/save `.ini` settings for this window.
        const NO_SAVED_SETTINGS = 1 << 8;
        const NO_MOUSE_INPUTS = 1 << 9;
        const MENU_BAR = 1 << 10;
        const HORIZONTAL_SCROLLBAR = 1 << 11;
        const NO_FOCUS_ON_APPEARING = 1 << 12;
        const NO_BRING_TO_FRONT_ON_FOCUS = 1 << 13;
        const ALWAYS_VERTICAL_SCROLLBAR = 1 << 14;
        const ALWAYS_HORIZONTAL_SCROLLBAR = 1 << 15;
        const ALWAYS_USE_WINDOW_PADDING = 1 << 16;
        const NO_NAV_INPUTS = 1 << 18;
        const NO_NAV_FOCUS = 1 << 19;
        const UNSAVED_DOCUMENT = 1 << 20;
        const NO_DOCKING = 1 << 21;
        const NO_NAV = Self::NO_NAV_INPUTS.bits() | Self::NO_NAV_FOCUS.bits();
        const NO_DECORATION = Self::NO_TITLE_BAR.bits()
            | Self::NO_RESIZE.bits()
            | Self::NO_SCROLLBAR.bits()
            | Self::NO_COLLAPSE.bits();
        const NO_INPUTS = Self::NO_MOUSE_INPUTS.bits() | Self::NO_NAV_INPUTS.bits() | Self::NO_NAV_FOCUS.bits();
        // Internal
        const NAV_FLATTENED = 1 << 23;
        const CHILD_WINDOW = 1 << 24;
        const TOOLTIP = 1 << 25;
        const POPUP = 1 << 26;
        const MODAL = 1 << 27;
        const CHILD_MENU = 1 << 28;
        const DOCK_NODE_HOST = 1 << 29;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputTextFlags: u32 {
        const CHARS_DECIMAL = 1 << 0;
        const CHARS_HEXADECIMAL = 1 << 1;
        const CHARS_UPPERCASE = 1 << 2;
        const CHARS_NO_BLANK = 1 << 3;
        const AUTO_SELECT_ALL = 1 << 4;
        const ENTER_RETURNS_TRUE = 1 << 5;
        const CALLBACK_COMPLETION = 1 << 6;
        const CALLBACK_HISTORY = 1 << 7;
        const CALLBACK_ALWAYS = 1 << 8;
        const CALLBACK_CHAR_FILTER = 1 << 9;
        const ALLOW_TAB_INPUT = 1 << 10;
        const CTRL_ENTER_FOR_NEW_LINE = 1 << 11;
        const NO_HORIZONTAL_SCROLL = 1 << 12;
        const ALWAYS_OVERWRITE = 1 << 13;
        const READ_ONLY = 1 << 14;
        const PASSWORD = 1 << 15;
        const NO_UNDO_REDO = 1 << 16;
        const CHARS_SCIENTIFIC = 1 << 17;
        const CALLBACK_RESIZE = 1 << 18;
        const CALLBACK_EDIT = 1 << 19;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TreeNodeFlags: u32 {
        const SELECTED = 1 << 0;
        const FRAMED = 1 << 1;
        const ALLOW_ITEM_OVERLAP = 1 << 2;
        const NO_TREE_PUSH_ON_OPEN = 1 << 3;
        const NO_AUTO_OPEN_ON_LOG = 1 << 4;
        const DEFAULT_OPEN = 1 << 5;
        const OPEN_ON_DOUBLE_CLICK = 1 << 6;
        const OPEN_ON_ARROW = 1 << 7;
        const LEAF = 1 << 8;
        const BULLET = 1 << 9;
        const FRAME_PADDING = 1 << 10;
        const SPAN_AVAIL_WIDTH = 1 << 11;
        const SPAN_FULL_WIDTH = 1 << 12;
        const NAV_LEFT_JUMPS_BACK_HERE = 1 << 13;
        const COLLAPSING_HEADER = Self::FRAMED.bits()
            | Self::NO_TREE_PUSH_ON_OPEN.bits()
            | Self::NO_AUTO_OPEN_ON_LOG.bits();
    }
}

bitflags! {
    /// The low five bits carry a mouse button index rather than flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PopupFlags: u32 {
        const MOUSE_BUTTON_LEFT = 0;
        const MOUSE_BUTTON_RIGHT = 1;
        const MOUSE_BUTTON_MIDDLE = 2;
        const MOUSE_BUTTON_MASK = 0x1F;
        const NO_OPEN_OVER_EXISTING_POPUP = 1 << 5;
        const NO_OPEN_OVER_ITEMS = 1 << 6;
        const ANY_POPUP_ID = 1 << 7;
        const ANY_POPUP_LEVEL = 1 << 8;
        const ANY_POPUP = Self::ANY_POPUP_ID.bits() | Self::ANY_POPUP_LEVEL.bits();
    }
}

impl PopupFlags {
    /// Mouse button index stored in the low bits.
    pub fn mouse_button(self) -> u32 {
        self.bits() & Self::MOUSE_BUTTON_MASK.bits()
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SelectableFlags: u32 {
        const DONT_CLOSE_POPUPS = 1 << 0;
        const SPAN_ALL_COLUMNS = 1 << 1;
        const ALLOW_DOUBLE_CLICK = 1 << 2;
        const DISABLED = 1 << 3;
        const ALLOW_ITEM_OVERLAP = 1 << 4;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ComboFlags: u32 {
        const POPUP_ALIGN_LEFT = 1 << 0;
        const HEIGHT_SMALL = 1 << 1;
        const HEIGHT_REGULAR = 1 << 2;
        const HEIGHT_LARGE = 1 << 3;
        const HEIGHT_LARGEST = 1 << 4;
        const NO_ARROW_BUTTON = 1 << 5;
        const NO_PREVIEW = 1 << 6;
        /// At most one height flag may be set.
        const HEIGHT_MASK = Self::HEIGHT_SMALL.bits()
            | Self::HEIGHT_REGULAR.bits()
            | Self::HEIGHT_LARGE.bits()
            | Self::HEIGHT_LARGEST.bits();
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TabBarFlags: u32 {
        const REORDERABLE = 1 << 0;
        const AUTO_SELECT_NEW_TABS = 1 << 1;
        const TAB_LIST_POPUP_BUTTON = 1 << 2;
        const NO_CLOSE_WITH_MIDDLE_MOUSE_BUTTON = 1 << 3;
        const NO_TAB_LIST_SCROLLING_BUTTONS = 1 << 4;
        const NO_TOOLTIP = 1 << 5;
        const FITTING_POLICY_RESIZE_DOWN = 1 << 6;
        const FITTING_POLICY_SCROLL = 1 << 7;
        const FITTING_POLICY_MASK = Self::FITTING_POLICY_RESIZE_DOWN.bits() | Self::FITTING_POLICY_SCROLL.bits();
        const FITTING_POLICY_DEFAULT = Self::FITTING_POLICY_RESIZE_DOWN.bits();
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TabItemFlags: u32 {
        const UNSAVED_DOCUMENT = 1 << 0;
        const SET_SELECTED = 1 << 1;
        const NO_CLOSE_WITH_MIDDLE_MOUSE_BUTTON = 1 << 2;
        const NO_PUSH_ID = 1 << 3;
        const NO_TOOLTIP = 1 << 4;
        const NO_REORDER = 1 << 5;
        const LEADING = 1 << 6;
        const TRAILING = 1 << 7;
    }
}

bitflags! {
    /// Bits 13..=15 hold a sizing policy value, not independent flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TableFlags: u32 {
        const RESIZABLE = 1 << 0;
        const REORDERABLE = 1 << 1;
        const HIDEABLE = 1 << 2;
        const SORTABLE = 1 << 3;
        const NO_SAVED_SETTINGS = 1 << 4;
        const CONTEXT_MENU_IN_BODY = 1 << 5;
        const ROW_BG = 1 << 6;
        const BORDERS_INNER_H = 1 << 7;
        const BORDERS_OUTER_H = 1 << 8;
        const BORDERS_INNER_V = 1 << 9;
        const BORDERS_OUTER_V = 1 << 10;
        const BORDERS_H = Self::BORDERS_INNER_H.bits() | Self::BORDERS_OUTER_H.bits();
        const BORDERS_V = Self::BORDERS_INNER_V.bits() | Self::BORDERS_OUTER_V.bits();
        const BORDERS_INNER = Self::BORDERS_INNER_V.bits() | Self::BORDERS_INNER_H.bits();
        const BORDERS_OUTER = Self::BORDERS_OUTER_V.bits() | Self::BORDERS_OUTER_H.bits();
        const BORDERS = Self::BORDERS_INNER.bits() | Self::BORDERS_OUTER.bits();
        const NO_BORDERS_IN_BODY = 1 << 11;
        const NO_BORDERS_IN_BODY_UNTIL_RESIZE = 1 << 12;
        const SIZING_FIXED_FIT = 1 << 13;
        const SIZING_FIXED_SAME = 2 << 13;
        const SIZING_STRETCH_PROP = 3 << 13;
        const SIZING_STRETCH_SAME = 4 << 13;
        const SIZING_MASK = 7 << 13;
        const NO_HOST_EXTEND_X = 1 << 16;
        const NO_HOST_EXTEND_Y = 1 << 17;
        const NO_KEEP_COLUMNS_VISIBLE = 1 << 18;
        const PRECISE_WIDTHS = 1 << 19;
        const NO_CLIP = 1 << 20;
        const PAD_OUTER_X = 1 << 21;
        const NO_PAD_OUTER_X = 1 << 22;
        const NO_PAD_INNER_X = 1 << 23;
        const SCROLL_X = 1 << 24;
        const SCROLL_Y = 1 << 25;
        const SORT_MULTI = 1 << 26;
        const SORT_TRISTATE = 1 << 27;
    }
}

impl TableFlags {
    /// The sizing policy bits alone.
    pub fn sizing_policy(self) -> Self {
        self & Self::SIZING_MASK
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TableColumnFlags: u32 {
        const DEFAULT_HIDE = 1 << 0;
        const DEFAULT_SORT = 1 << 1;
        const WIDTH_STRETCH = 1 << 2;
        const WIDTH_FIXED = 1 << 3;
        const NO_RESIZE = 1 << 4;
        const NO_REORDER = 1 << 5;
        const NO_HIDE = 1 << 6;
        const NO_CLIP = 1 << 7;
        const NO_SORT = 1 << 8;
        const NO_SORT_ASCENDING = 1 << 9;
        const NO_SORT_DESCENDING = 1 << 10;
        const NO_HEADER_WIDTH = 1 << 11;
        const PREFER_SORT_ASCENDING = 1 << 12;
        const PREFER_SORT_DESCENDING = 1 << 13;
        const INDENT_ENABLE = 1 << 14;
        const INDENT_DISABLE = 1 << 15;
        // Status bits, read-only
        const IS_ENABLED = 1 << 20;
        const IS_VISIBLE = 1 << 21;
        const IS_SORTED = 1 << 22;
        const IS_HOVERED = 1 << 23;
        const WIDTH_MASK = Self::WIDTH_STRETCH.bits() | Self::WIDTH_FIXED.bits();
        const INDENT_MASK = Self::INDENT_ENABLE.bits() | Self::INDENT_DISABLE.bits();
        const STATUS_MASK = Self::IS_ENABLED.bits()
            | Self::IS_VISIBLE.bits()
            | Self::IS_SORTED.bits()
            | Self::IS_HOVERED.bits();
        const NO_DIRECT_RESIZE = 1 << 30;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TableRowFlags: u32 {
        const HEADERS = 1 << 0;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FocusedFlags: u32 {
        const CHILD_WINDOWS = 1 << 0;
        const ROOT_WINDOW = 1 << 1;
        const ANY_WINDOW = 1 << 2;
        const ROOT_AND_CHILD_WINDOWS = Self::ROOT_WINDOW.bits() | Self::CHILD_WINDOWS.bits();
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HoveredFlags: u32 {
        const CHILD_WINDOWS = 1 << 0;
        const ROOT_WINDOW = 1 << 1;
        const ANY_WINDOW = 1 << 2;
        const ALLOW_WHEN_BLOCKED_BY_POPUP = 1 << 3;
        const ALLOW_WHEN_BLOCKED_BY_ACTIVE_ITEM = 1 << 5;
        const ALLOW_WHEN_OVERLAPPED = 1 << 6;
        const ALLOW_WHEN_DISABLED = 1 << 7;
        const RECT_ONLY = Self::ALLOW_WHEN_BLOCKED_BY_POPUP.bits()
            | Self::ALLOW_WHEN_BLOCKED_BY_ACTIVE_ITEM.bits()
            | Self::ALLOW_WHEN_OVERLAPPED.bits();
        const ROOT_AND_CHILD_WINDOWS = Self::ROOT_WINDOW.bits() | Self::CHILD_WINDOWS.bits();
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DragDropFlags: u32 {
        const SOURCE_NO_PREVIEW_TOOLTIP = 1 << 0;
        const SOURCE_NO_DISABLE_HOVER = 1 << 1;
        const SOURCE_NO_HOLD_TO_OPEN_OTHERS = 1 << 2;
        const SOURCE_ALLOW_NULL_ID = 1 << 3;
        const SOURCE_EXTERN = 1 << 4;
        const SOURCE_AUTO_EXPIRE_PAYLOAD = 1 << 5;
        const ACCEPT_BEFORE_DELIVERY = 1 << 10;
        const ACCEPT_NO_DRAW_DEFAULT_RECT = 1 << 11;
        const ACCEPT_NO_PREVIEW_TOOLTIP = 1 << 12;
        const ACCEPT_PEEK_ONLY = Self::ACCEPT_BEFORE_DELIVERY.bits() | Self::ACCEPT_NO_DRAW_DEFAULT_RECT.bits();
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SliderFlags: u32 {
        const ALWAYS_CLAMP = 1 << 4;
        const LOGARITHMIC = 1 << 5;
        const NO_ROUND_TO_FORMAT = 1 << 6;
        const NO_INPUT = 1 << 7;
        /// Bits that used to carry a float power argument; setting any is a caller error.
        const INVALID_MASK = 0x7000_000F;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ColorEditFlags: u32 {
        const NO_ALPHA = 1 << 1;
        const NO_PICKER = 1 << 2;
        const NO_OPTIONS = 1 << 3;
        const NO_SMALL_PREVIEW = 1 << 4;
        const NO_INPUTS = 1 << 5;
        const NO_TOOLTIP = 1 << 6;
        const NO_LABEL = 1 << 7;
        const NO_SIDE_PREVIEW = 1 << 8;
        const NO_DRAG_DROP = 1 << 9;
        const NO_BORDER = 1 << 10;
        const ALPHA_BAR = 1 << 16;
        const ALPHA_PREVIEW = 1 << 17;
        const ALPHA_PREVIEW_HALF = 1 << 18;
        const HDR = 1 << 19;
        const DISPLAY_RGB = 1 << 20;
        const DISPLAY_HSV = 1 << 21;
        const DISPLAY_HEX = 1 << 22;
        const UINT8 = 1 << 23;
        const FLOAT = 1 << 24;
        const PICKER_HUE_BAR = 1 << 25;
        const PICKER_HUE_WHEEL = 1 << 26;
        const INPUT_RGB = 1 << 27;
        const INPUT_HSV = 1 << 28;
        const DEFAULT_OPTIONS = Self::UINT8.bits()
            | Self::DISPLAY_RGB.bits()
            | Self::INPUT_RGB.bits()
            | Self::PICKER_HUE_BAR.bits();
        const DISPLAY_MASK = Self::DISPLAY_RGB.bits() | Self::DISPLAY_HSV.bits() | Self::DISPLAY_HEX.bits();
        const DATA_TYPE_MASK = Self::UINT8.bits() | Self::FLOAT.bits();
        const PICKER_MASK = Self::PICKER_HUE_WHEEL.bits() | Self::PICKER_HUE_BAR.bits();
        const INPUT_MASK = Self::INPUT_RGB.bits() | Self::INPUT_HSV.bits();
    }
}

impl ColorEditFlags {
    /// Fill each empty option group (display, data type, picker, input) from `DEFAULT_OPTIONS`.
    pub fn with_default_options(self) -> Self {
        let mut flags = self;
        for mask in [
            Self::DISPLAY_MASK,
            Self::DATA_TYPE_MASK,
            Self::PICKER_MASK,
            Self::INPUT_MASK,
        ] {
            if !flags.intersects(mask) {
                flags |= Self::DEFAULT_OPTIONS & mask;
            }
        }
        flags
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ConfigFlags: u32 {
        const NAV_ENABLE_KEYBOARD = 1 << 0;
        const NAV_ENABLE_GAMEPAD = 1 << 1;
        const NAV_ENABLE_SET_MOUSE_POS = 1 << 2;
        const NAV_NO_CAPTURE_KEYBOARD = 1 << 3;
        /// Ignore mouse position and buttons coming from the backend.
        const NO_MOUSE = 1 << 4;
        /// Don't ask the platform to change the OS cursor shape.
        const NO_MOUSE_CURSOR_CHANGE = 1 << 5;
        const DOCKING_ENABLE = 1 << 6;
        const VIEWPORTS_ENABLE = 1 << 10;
        const DPI_ENABLE_SCALE_VIEWPORTS = 1 << 14;
        const DPI_ENABLE_SCALE_FONTS = 1 << 15;
        const IS_SRGB = 1 << 20;
        const IS_TOUCH_SCREEN = 1 << 21;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BackendFlags: u32 {
        const HAS_GAMEPAD = 1 << 0;
        const HAS_MOUSE_CURSORS = 1 << 1;
        const HAS_SET_MOUSE_POS = 1 << 2;
        /// Renderer supports `DrawCmd::vtx_offset` as a base vertex.
        const RENDERER_HAS_VTX_OFFSET = 1 << 3;
        const PLATFORM_HAS_VIEWPORTS = 1 << 10;
        const HAS_MOUSE_HOVERED_VIEWPORT = 1 << 11;
        const RENDERER_HAS_VIEWPORTS = 1 << 12;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ButtonFlags: u32 {
        const MOUSE_BUTTON_LEFT = 1 << 0;
        const MOUSE_BUTTON_RIGHT = 1 << 1;
        const MOUSE_BUTTON_MIDDLE = 1 << 2;
        const MOUSE_BUTTON_MASK = Self::MOUSE_BUTTON_LEFT.bits()
            | Self::MOUSE_BUTTON_RIGHT.bits()
            | Self::MOUSE_BUTTON_MIDDLE.bits();
        const MOUSE_BUTTON_DEFAULT = Self::MOUSE_BUTTON_LEFT.bits();
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ViewportFlags: u32 {
        const IS_PLATFORM_WINDOW = 1 << 0;
        const IS_PLATFORM_MONITOR = 1 << 1;
        const OWNED_BY_APP = 1 << 2;
        const NO_DECORATION = 1 << 3;
        const NO_TASK_BAR_ICON = 1 << 4;
        const NO_FOCUS_ON_APPEARING = 1 << 5;
        const NO_FOCUS_ON_CLICK = 1 << 6;
        const NO_INPUTS = 1 << 7;
        const NO_RENDERER_CLEAR = 1 << 8;
        const TOP_MOST = 1 << 9;
        const MINIMIZED = 1 << 10;
        const NO_AUTO_MERGE = 1 << 11;
        const CAN_HOST_OTHER_WINDOWS = 1 << 12;
    }
}

/// Index into [`crate::Style::colors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum StyleColor {
    Text,
    TextDisabled,
    WindowBg,
    ChildBg,
    PopupBg,
    Border,
    BorderShadow,
    FrameBg,
    FrameBgHovered,
    FrameBgActive,
    TitleBg,
    TitleBgActive,
    TitleBgCollapsed,
    MenuBarBg,
    ScrollbarBg,
    ScrollbarGrab,
    ScrollbarGrabHovered,
    ScrollbarGrabActive,
    CheckMark,
    SliderGrab,
    SliderGrabActive,
    Button,
    ButtonHovered,
    ButtonActive,
    Header,
    HeaderHovered,
    HeaderActive,
    Separator,
    SeparatorHovered,
    SeparatorActive,
    ResizeGrip,
    ResizeGripHovered,
    ResizeGripActive,
    Tab,
    TabHovered,
    TabActive,
    TabUnfocused,
    TabUnfocusedActive,
    DockingPreview,
    DockingEmptyBg,
    PlotLines,
    PlotLinesHovered,
    PlotHistogram,
    PlotHistogramHovered,
    TableHeaderBg,
    TableBorderStrong,
    TableBorderLight,
    TableRowBg,
    TableRowBgAlt,
    TextSelectedBg,
    DragDropTarget,
    NavHighlight,
    NavWindowingHighlight,
    NavWindowingDimBg,
    ModalWindowDimBg,
}

impl StyleColor {
    pub const COUNT: usize = 55;

    pub const ALL: [StyleColor; Self::COUNT] = [
        Self::Text,
        Self::TextDisabled,
        Self::WindowBg,
        Self::ChildBg,
        Self::PopupBg,
        Self::Border,
        Self::BorderShadow,
        Self::FrameBg,
        Self::FrameBgHovered,
        Self::FrameBgActive,
        Self::TitleBg,
        Self::TitleBgActive,
        Self::TitleBgCollapsed,
        Self::MenuBarBg,
        Self::ScrollbarBg,
        Self::ScrollbarGrab,
        Self::ScrollbarGrabHovered,
        Self::ScrollbarGrabActive,
        Self::CheckMark,
        Self::SliderGrab,
        Self::SliderGrabActive,
        Self::Button,
        Self::ButtonHovered,
        Self::ButtonActive,
        Self::Header,
        Self::HeaderHovered,
        Self::HeaderActive,
        Self::Separator,
        Self::SeparatorHovered,
        Self::SeparatorActive,
        Self::ResizeGrip,
        Self::ResizeGripHovered,
        Self::ResizeGripActive,
        Self::Tab,
        Self::TabHovered,
        Self::TabActive,
        Self::TabUnfocused,
        Self::TabUnfocusedActive,
        Self::DockingPreview,
        Self::DockingEmptyBg,
        Self::PlotLines,
        Self::PlotLinesHovered,
        Self::PlotHistogram,
        Self::PlotHistogramHovered,
        Self::TableHeaderBg,
        Self::TableBorderStrong,
        Self::TableBorderLight,
        Self::TableRowBg,
        Self::TableRowBgAlt,
        Self::TextSelectedBg,
        Self::DragDropTarget,
        Self::NavHighlight,
        Self::NavWindowingHighlight,
        Self::NavWindowingDimBg,
        Self::ModalWindowDimBg,
    ];

    /// Name used in `.ini` files and debug tools.
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::TextDisabled => "TextDisabled",
            Self::WindowBg => "WindowBg",
            Self::ChildBg => "ChildBg",
            Self::PopupBg => "PopupBg",
            Self::Border => "Border",
            Self::BorderShadow => "BorderShadow",
            Self::FrameBg => "FrameBg",
            Self::FrameBgHovered => "FrameBgHovered",
            Self::FrameBgActive => "FrameBgActive",
            Self::TitleBg => "TitleBg",
            Self::TitleBgActive => "TitleBgActive",
            Self::TitleBgCollapsed => "TitleBgCollapsed",
            Self::MenuBarBg => "MenuBarBg",
            Self::ScrollbarBg => "ScrollbarBg",
            Self::ScrollbarGrab => "ScrollbarGrab",
            Self::ScrollbarGrabHovered => "ScrollbarGrabHovered",
            Self::ScrollbarGrabActive => "ScrollbarGrabActive",
            Self::CheckMark => "CheckMark",
            Self::SliderGrab => "SliderGrab",
            Self::SliderGrabActive => "SliderGrabActive",
            Self::Button => "Button",
            Self::ButtonHovered => "ButtonHovered",
            Self::ButtonActive => "ButtonActive",
            Self::Header => "Header",
            Self::HeaderHovered => "HeaderHovered",
            Self::HeaderActive => "HeaderActive",
            Self::Separator => "Separator",
            Self::SeparatorHovered => "SeparatorHovered",
            Self::SeparatorActive => "SeparatorActive",
            Self::ResizeGrip => "ResizeGrip",
            Self::ResizeGripHovered => "ResizeGripHovered",
            Self::ResizeGripActive => "ResizeGripActive",
            Self::Tab => "Tab",
            Self::TabHovered => "TabHovered",
            Self::TabActive => "TabActive",
            Self::TabUnfocused => "TabUnfocused",
            Self::TabUnfocusedActive => "TabUnfocusedActive",
            Self::DockingPreview => "DockingPreview",
            Self::DockingEmptyBg => "DockingEmptyBg",
            Self::PlotLines => "PlotLines",
            Self::PlotLinesHovered => "PlotLinesHovered",
            Self::PlotHistogram => "PlotHistogram",
            Self::PlotHistogramHovered => "PlotHistogramHovered",
            Self::TableHeaderBg => "TableHeaderBg",
            Self::TableBorderStrong => "TableBorderStrong",
            Self::TableBorderLight => "TableBorderLight",
            Self::TableRowBg => "TableRowBg",
            Self::TableRowBgAlt => "TableRowBgAlt",
            Self::TextSelectedBg => "TextSelectedBg",
            Self::DragDropTarget => "DragDropTarget",
            Self::NavHighlight => "NavHighlight",
            Self::NavWindowingHighlight => "NavWindowingHighlight",
            Self::NavWindowingDimBg => "NavWindowingDimBg",
            Self::ModalWindowDimBg => "ModalWindowDimBg",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

/// Index of a pushable style variable, see [`crate::Style::set_var`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum StyleVar {
    Alpha,
    WindowPadding,
    WindowRounding,
    WindowBorderSize,
    WindowMinSize,
    WindowTitleAlign,
    ChildRounding,
    ChildBorderSize,
    PopupRounding,
    PopupBorderSize,
    FramePadding,
    FrameRounding,
    FrameBorderSize,
    ItemSpacing,
    ItemInnerSpacing,
    IndentSpacing,
    CellPadding,
    ScrollbarSize,
    ScrollbarRounding,
    GrabMinSize,
    GrabRounding,
    TabRounding,
    ButtonTextAlign,
    SelectableTextAlign,
}

impl StyleVar {
    pub const COUNT: usize = 24;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_rect_corner_flags_legacy_values() {
        // Old top-left | bottom-left
        let fixed = DrawFlags::from_bits_retain(0x05).fix_rect_corner_flags();
        assert_eq!(
            fixed,
            DrawFlags::ROUND_CORNERS_TOP_LEFT | DrawFlags::ROUND_CORNERS_BOTTOM_LEFT
        );
        assert_eq!(
            DrawFlags::from_bits_retain(0x0F).fix_rect_corner_flags(),
            DrawFlags::ROUND_CORNERS_ALL
        );
        assert_eq!(
            DrawFlags::from_bits_retain(!0).fix_rect_corner_flags(),
            DrawFlags::ROUND_CORNERS_ALL
        );
    }

    #[test]
    fn test_fix_rect_corner_flags_defaults_to_all() {
        assert_eq!(
            DrawFlags::empty().fix_rect_corner_flags(),
            DrawFlags::ROUND_CORNERS_ALL
        );
        assert_eq!(
            DrawFlags::ROUND_CORNERS_NONE.fix_rect_corner_flags(),
            DrawFlags::ROUND_CORNERS_NONE
        );
        assert_eq!(
            DrawFlags::ROUND_CORNERS_TOP.fix_rect_corner_flags(),
            DrawFlags::ROUND_CORNERS_TOP
        );
    }

    #[test]
    fn test_color_edit_default_options_fill_empty_groups() {
        let flags = ColorEditFlags::DISPLAY_HSV.with_default_options();
        assert!(flags.contains(ColorEditFlags::DISPLAY_HSV));
        assert!(!flags.contains(ColorEditFlags::DISPLAY_RGB));
        assert!(flags.contains(ColorEditFlags::UINT8 | ColorEditFlags::INPUT_RGB));
        assert!(flags.contains(ColorEditFlags::PICKER_HUE_BAR));
    }

    #[test]
    fn test_style_color_names_round_trip() {
        assert_eq!(StyleColor::ALL.len(), StyleColor::COUNT);
        for (i, c) in StyleColor::ALL.iter().enumerate() {
            assert_eq!(*c as usize, i);
            assert_eq!(StyleColor::from_name(c.name()), Some(*c));
        }
    }

    #[test]
    fn test_popup_mouse_button_bits() {
        let flags = PopupFlags::MOUSE_BUTTON_RIGHT | PopupFlags::NO_OPEN_OVER_ITEMS;
        assert_eq!(flags.mouse_button(), 1);
        assert_eq!(TableFlags::SIZING_STRETCH_SAME.sizing_policy(), TableFlags::SIZING_STRETCH_SAME);
    }
}

//! Label renderer
//!
//! Renders a LabelRecord into a ZPL document for a 400-dot wide label
//! (50 mm at 203 dpi).

use chrono::NaiveDate;
use label_printer::{Justify, LabelEncoding, ZplBuilder};

use super::types::{LabelDocument, LabelRecord};

/// Caption printed at the top of every label
pub const DEFAULT_LOCATION: &str = "LUGAR: Comedor Bella Italia";

const DATE_FORMAT: &str = "%d/%m/%Y";

// Label geometry, in dots
const PRINT_WIDTH: u32 = 400;
const HOME_X: u32 = 20;
const HOME_Y: u32 = 20;
const CONTENT_WIDTH: u32 = 360;
const HEADER_FONT_HEIGHT: u32 = 30;
const BODY_FONT_HEIGHT: u32 = 25;
const TEXT_X: u32 = 10;
const EMPLOYEE_Y: u32 = 45;
const MENU_Y: u32 = 80;
// Two menu lines share the single-line slot in a smaller font
const MENU_SPLIT_Y: [u32; 2] = [73, 94];
const MENU_SPLIT_FONT: u32 = 20;
const ELABORATION_Y: u32 = 115;
const EXPIRATION_Y: u32 = 150;
const BARCODE_X: u32 = 40;
const BARCODE_Y: u32 = 175;
const BARCODE_HEIGHT: u32 = 120;

/// Label renderer
///
/// Pure: the same record and dates always give the same bytes.
#[derive(Debug, Clone)]
pub struct LabelRenderer {
    location: String,
    encoding: LabelEncoding,
}

impl LabelRenderer {
    /// Create a renderer with a header caption
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            encoding: LabelEncoding::default(),
        }
    }

    /// Select the printer character set
    pub fn with_encoding(mut self, encoding: LabelEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Render a label
    pub fn render(
        &self,
        record: &LabelRecord,
        elaborated: NaiveDate,
        expires: NaiveDate,
    ) -> LabelDocument {
        let mut b = ZplBuilder::new(self.encoding);

        b.start();
        b.print_width(PRINT_WIDTH);
        b.label_home(HOME_X, HOME_Y);
        b.charset();
        b.blank();

        self.render_header(&mut b);
        b.blank();

        b.default_font('0', BODY_FONT_HEIGHT);
        b.text(TEXT_X, EMPLOYEE_Y, record.employee_name());
        self.render_menu(&mut b, record);
        b.text(
            TEXT_X,
            ELABORATION_Y,
            &format!("ELAB: {}", elaborated.format(DATE_FORMAT)),
        );
        b.text(
            TEXT_X,
            EXPIRATION_Y,
            &format!("VENC: {}", expires.format(DATE_FORMAT)),
        );
        b.blank();

        b.barcode_defaults(2, 3.0, BARCODE_HEIGHT);
        b.ean13(BARCODE_X, BARCODE_Y, BARCODE_HEIGHT, record.code());
        b.blank();

        b.end();

        LabelDocument::new(b.build())
    }

    /// Location caption, centered, underlined by a rule
    fn render_header(&self, b: &mut ZplBuilder) {
        b.default_font('0', HEADER_FONT_HEIGHT);
        b.text_block(0, 5, CONTENT_WIDTH, 40, 1, Justify::Center, &self.location);
        b.graphic_box(0, 35, CONTENT_WIDTH, 2, 2);
    }

    fn render_menu(&self, b: &mut ZplBuilder, record: &LabelRecord) {
        let line1 = format!("Menu: {}", record.menu_line1());

        if record.menu_line2().is_empty() {
            b.text(TEXT_X, MENU_Y, &line1);
        } else {
            b.text_scaled(TEXT_X, MENU_SPLIT_Y[0], MENU_SPLIT_FONT, MENU_SPLIT_FONT, &line1);
            b.text_scaled(
                TEXT_X,
                MENU_SPLIT_Y[1],
                MENU_SPLIT_FONT,
                MENU_SPLIT_FONT,
                record.menu_line2(),
            );
        }
    }
}

impl Default for LabelRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATION)
    }
}

use std::fmt;

use crate::{
    grid::{
        viz::{VizLayerEntry, VizSelection},
        viz_grid::VizGrid,
    },
    model::input_shape::InputShape,
};

use super::rf_engine::LayerResult;

/// Layer table with a summary of the last layer, rendered through `Display`.
pub struct LayerTable<'a> {
    pub input: &'a InputShape,
    pub results: &'a [LayerResult],
}

impl fmt::Display for LayerTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\nLayer Stack")?;
        writeln!(f, "===========")?;
        writeln!(f, "\nInput Shape: {}", self.input)?;
        writeln!(f, "\nLayer Details:")?;
        writeln!(f, "{:-<90}", "")?;
        writeln!(
            f,
            "{:<4} {:<10} {:<4} {:<4} {:<4} {:<4} {:<6} {:<8} {:<8} {:<20}",
            "#", "Type", "K", "S", "P", "D", "Out", "RF", "Jump", "Output Shape"
        )?;
        writeln!(f, "{:-<90}", "")?;

        if self.results.is_empty() {
            writeln!(f, "(no layers)")?;
        }

        for r in self.results {
            let out_channels = r
                .out_channels
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string());
            let shape = format!("{}×{}×{}", r.h, r.w, r.c);
            writeln!(
                f,
                "{:<4} {:<10} {:<4} {:<4} {:<4} {:<4} {:<6} {:<8} {:<8} {:<20}",
                r.index,
                r.kind,
                r.kernel,
                r.stride,
                r.padding,
                r.dilation,
                out_channels,
                r.rf,
                r.jump,
                shape
            )?;
        }

        writeln!(f, "{:-<90}", "")?;

        if let Some(last) = self.results.last() {
            writeln!(f, "\nStack Summary:")?;
            writeln!(f, "Receptive Field: {}×{}", last.rf, last.rf)?;
            writeln!(f, "Total Stride: {}", last.jump)?;
            writeln!(f, "Output Shape: {}×{}×{}", last.h, last.w, last.c)?;
        }
        Ok(())
    }
}

pub fn format_layer_table(input: &InputShape, results: &[LayerResult]) -> String {
    LayerTable { input, results }.to_string()
}

pub fn print_layer_table(input: &InputShape, results: &[LayerResult]) {
    print!("{}", LayerTable { input, results });
}

// Marks cells with brackets, everything else padded to the same width
struct MarkedGrid<'a> {
    grid: &'a VizGrid,
    marked: &'a [(usize, usize)],
}

impl fmt::Display for MarkedGrid<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.grid.is_empty() {
            return writeln!(f, "(empty)");
        }
        let width = self
            .grid
            .as_slice()
            .iter()
            .map(|v| v.to_string().len())
            .max()
            .unwrap_or(1);

        for (r, row) in self.grid.to_rows().iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                if self.marked.contains(&(r, c)) {
                    write!(f, "[{:>width$}]", v, width = width)?;
                } else {
                    write!(f, " {:>width$} ", v, width = width)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One visualized layer with the selected output cell and its input cells marked.
pub struct VizEntryView<'a> {
    pub entry: &'a VizLayerEntry,
    pub selection: &'a VizSelection,
}

impl fmt::Display for VizEntryView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.entry;
        let (oy, ox) = (self.selection.oy, self.selection.ox);
        let cells = entry.contributing_cells(oy, ox);

        writeln!(
            f,
            "\nLayer {} {} (k={}, s={}, p={}, d={})",
            entry.index, entry.kind, entry.kernel, entry.stride, entry.padding, entry.dilation
        )?;
        writeln!(f, "{:-<60}", "")?;
        writeln!(f, "Input {}×{}:", entry.input.rows(), entry.input.cols())?;
        write!(f, "{}", MarkedGrid { grid: &entry.input, marked: &cells })?;
        writeln!(f, "\nOutput {}×{}:", entry.out_h, entry.out_w)?;
        write!(f, "{}", MarkedGrid { grid: &entry.output, marked: &[(oy, ox)] })?;

        match entry.output_value(oy, ox) {
            Some(value) => writeln!(
                f,
                "\nOutput ({}, {}) = {} from {} input cells",
                oy,
                ox,
                value,
                cells.len()
            ),
            None => writeln!(f, "\nOutput grid is empty"),
        }
    }
}

pub fn format_viz_entry(entry: &VizLayerEntry, selection: &VizSelection) -> String {
    VizEntryView { entry, selection }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compute::rf_engine::compute_rf_and_shapes,
        grid::viz::{build_viz, clamp_selection},
        model::layer_spec::LayerSpec,
    };

    #[test]
    fn table_lists_every_layer_and_summary() {
        let input = InputShape::default();
        let layers = [
            LayerSpec::conv2d_with(3, 1, 1, 1, Some(16)),
            LayerSpec::max_pool2d(2, 2, 0),
        ];
        let table = format_layer_table(&input, &compute_rf_and_shapes(&layers, &input));

        assert!(table.contains("Input Shape: 224×224×3"));
        assert!(table.contains("Conv2D"));
        assert!(table.contains("MaxPool2D"));
        assert!(table.contains("224×224×16"));
        assert!(table.contains("Receptive Field: 4×4"));
        assert!(table.contains("Total Stride: 2"));
        assert!(table.contains("Output Shape: 112×112×16"));
    }

    #[test]
    fn empty_table_says_so() {
        let table = format_layer_table(&InputShape::default(), &[]);
        assert!(table.contains("(no layers)"));
        assert!(!table.contains("Stack Summary"));
    }

    #[test]
    fn viz_entry_marks_selection_and_sources() {
        let input = InputShape { h: 4, w: 4, c: 1 };
        let entries = build_viz(&[LayerSpec::conv2d(2, 2, 0)], &input, 3, 8);
        let selection = clamp_selection(&entries, 1, 0, 0).unwrap();
        let text = format_viz_entry(&entries[0], &selection);

        assert!(text.contains("[10]"));
        assert!(text.contains("[ 0][ 1]"));
        assert!(text.contains("Output (0, 0) = 10 from 4 input cells"));
    }

    #[test]
    fn empty_output_grid_is_reported() {
        let input = InputShape { h: 2, w: 2, c: 1 };
        let entries = build_viz(&[LayerSpec::conv2d(3, 1, 0)], &input, 3, 8);
        let selection = clamp_selection(&entries, 1, 0, 0).unwrap();
        let text = VizEntryView {
            entry: &entries[0],
            selection: &selection,
        }
        .to_string();

        assert!(text.contains("Output 0×0:\n(empty)"));
        assert!(text.ends_with("Output grid is empty\n"));
    }
}

//! Visualization utilities for graph_slam
//!
//! Collects trajectories and landmark sets and renders them with gnuplot.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{Point2D, SlamError, SlamResult};
use crate::slam::Estimate;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const BLUE: &str = "#0000FF";
    pub const ORANGE: &str = "#FFA500";

    // Semantic colors
    pub const GROUND_TRUTH: &str = BLUE;
    pub const LANDMARK: &str = BLACK;
    pub const OFFLINE: &str = RED;
    pub const ONLINE: &str = ORANGE;
    pub const ESTIMATED_LANDMARK: &str = "#35C788";
}

/// Style for trajectory rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

#[derive(Debug, Clone)]
enum Series {
    Lines { x: Vec<f64>, y: Vec<f64>, style: PathStyle },
    Points { x: Vec<f64>, y: Vec<f64>, style: PointStyle },
}

fn split_xy(points: &[Point2D]) -> (Vec<f64>, Vec<f64>) {
    points.iter().map(|p| (p.x, p.y)).unzip()
}

/// Plot builder; everything is drawn into one set of axes when saved
pub struct Visualizer {
    title: String,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    series: Vec<Series>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            x_label: "X [m]".to_string(),
            y_label: "Y [m]".to_string(),
            x_range: None,
            y_range: None,
            series: Vec::new(),
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    /// Fix both axes to the square world `[0, size]`
    pub fn set_world(&mut self, size: f64) -> &mut Self {
        self.x_range = Some((0.0, size));
        self.y_range = Some((0.0, size));
        self
    }

    pub fn num_series(&self) -> usize {
        self.series.len()
    }

    pub fn plot_trajectory(&mut self, poses: &[Point2D], style: &PathStyle) -> &mut Self {
        let (x, y) = split_xy(poses);
        self.series.push(Series::Lines { x, y, style: style.clone() });
        self
    }

    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        let (x, y) = split_xy(points);
        self.series.push(Series::Points { x, y, style: style.clone() });
        self
    }

    pub fn plot_true_landmarks(&mut self, landmarks: &[Point2D]) -> &mut Self {
        self.plot_points(
            landmarks,
            &PointStyle::new(colors::LANDMARK, "Landmarks").with_symbol('*').with_size(2.0),
        )
    }

    /// Plot the retained poses and every solved landmark of an estimate
    pub fn plot_estimate(&mut self, estimate: &Estimate, caption: &str, color: &str) -> &mut Self {
        let landmarks: Vec<Point2D> = estimate.landmarks.iter().filter_map(|l| *l).collect();
        if estimate.poses.len() > 1 {
            self.plot_trajectory(&estimate.poses, &PathStyle::new(color, caption));
        } else {
            self.plot_points(&estimate.poses, &PointStyle::new(color, caption).with_size(1.5));
        }
        self.plot_points(
            &landmarks,
            &PointStyle::new(colors::ESTIMATED_LANDMARK, &format!("{} landmarks", caption)).with_symbol('x'),
        )
    }

    fn render(&self) -> Figure {
        let mut figure = Figure::new();
        let axes = figure.axes2d();

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);
        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        axes.set_aspect_ratio(AutoOption::Fix(1.0));

        for series in &self.series {
            match series {
                Series::Lines { x, y, style } => {
                    axes.lines(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        LineWidth(style.line_width),
                    ]);
                }
                Series::Points { x, y, style } => {
                    axes.points(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        PointSymbol(style.symbol),
                        PointSize(style.size),
                    ]);
                }
            }
        }
        figure
    }

    /// Save plot to SVG file
    pub fn save_svg(&self, path: &str) -> SlamResult<()> {
        self.render()
            .save_to_svg(path, 800, 600)
            .map_err(|e| SlamError::VisualizationError(e.to_string()))
    }

    /// Save plot to PNG file
    pub fn save_png(&self, path: &str, width: u32, height: u32) -> SlamResult<()> {
        self.render()
            .save_to_png(path, width, height)
            .map_err(|e| SlamError::VisualizationError(e.to_string()))
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

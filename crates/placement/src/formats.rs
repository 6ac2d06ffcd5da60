//! Creative-asset format analysis — derived once from all available assets
//! and consulted by every placement gate.

use serde::{Deserialize, Serialize};

use adpilot_core::types::{AspectRatio, AssetKind, CreativeAsset};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatAnalysis {
    pub has_square_image: bool,
    pub has_landscape_image: bool,
    pub has_portrait_image: bool,
    pub has_square_video: bool,
    pub has_landscape_video: bool,
    pub has_vertical_video: bool,
    pub has_carousel: bool,
    pub video_durations: Vec<f32>,
    pub total_assets: usize,
}

impl FormatAnalysis {
    pub fn analyze(assets: &[CreativeAsset]) -> Self {
        let mut analysis = Self {
            total_assets: assets.len(),
            ..Default::default()
        };
        for asset in assets {
            match (asset.kind, asset.aspect_ratio) {
                (AssetKind::Image, AspectRatio::Square) => analysis.has_square_image = true,
                (AssetKind::Image, AspectRatio::Landscape) => analysis.has_landscape_image = true,
                (AssetKind::Image, AspectRatio::Portrait | AspectRatio::Vertical) => {
                    analysis.has_portrait_image = true
                }
                (AssetKind::Video, AspectRatio::Square) => analysis.has_square_video = true,
                (AssetKind::Video, AspectRatio::Landscape) => analysis.has_landscape_video = true,
                (AssetKind::Video, AspectRatio::Portrait | AspectRatio::Vertical) => {
                    analysis.has_vertical_video = true
                }
                (AssetKind::Carousel, _) => analysis.has_carousel = true,
            }
            if asset.kind == AssetKind::Video {
                if let Some(duration) = asset.duration_secs {
                    analysis.video_durations.push(duration);
                }
            }
        }
        analysis
    }

    /// Square or landscape coverage in any medium — the baseline feed
    /// requirement.
    pub fn has_feed_format(&self) -> bool {
        self.has_square_image
            || self.has_landscape_image
            || self.has_square_video
            || self.has_landscape_video
    }

    pub fn has_square_or_landscape_image(&self) -> bool {
        self.has_square_image || self.has_landscape_image
    }

    pub fn has_story_format(&self) -> bool {
        self.has_vertical_video || self.has_portrait_image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(kind: AssetKind, ratio: AspectRatio) -> CreativeAsset {
        CreativeAsset {
            url: "https://cdn.example.com/a".to_string(),
            kind,
            aspect_ratio: ratio,
            duration_secs: if kind == AssetKind::Video {
                Some(15.0)
            } else {
                None
            },
        }
    }

    #[test]
    fn test_analyze_flags_formats() {
        let analysis = FormatAnalysis::analyze(&[
            asset(AssetKind::Image, AspectRatio::Square),
            asset(AssetKind::Video, AspectRatio::Vertical),
        ]);
        assert!(analysis.has_square_image);
        assert!(analysis.has_vertical_video);
        assert!(!analysis.has_landscape_image);
        assert_eq!(analysis.video_durations, vec![15.0]);
        assert_eq!(analysis.total_assets, 2);
    }

    #[test]
    fn test_empty_assets() {
        let analysis = FormatAnalysis::analyze(&[]);
        assert!(!analysis.has_feed_format());
        assert!(!analysis.has_story_format());
        assert_eq!(analysis.total_assets, 0);
    }
}

//! Filter registry and command-line filter chains.
//!
//! The registry maps filter names (and aliases) to a [`FilterSpec`] holding
//! the filter's arity and an entry point taking positional string arguments.
//! [`FilterRegistry::standard()`] registers every built-in filter.
//!
//! # Example
//!
//! ```
//! use image_craft::{FilterRegistry, Image, Rgb};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let registry = FilterRegistry::standard();
//! let mut image = Image::filled(8, 8, Rgb::WHITE).unwrap();
//! let mut rng = StdRng::seed_from_u64(1);
//!
//! let args = vec!["4".to_string(), "2".to_string()];
//! registry.apply("crop", &mut image, &args, &mut rng).unwrap();
//! registry.apply("neg", &mut image, &[], &mut rng).unwrap();
//! assert_eq!(image.dimensions(), (4, 2));
//! assert_eq!(image.get(0, 0), Some(Rgb::BLACK));
//! ```

use std::collections::HashMap;

use rand::RngCore;
use tracing::{debug, trace};

use crate::error::{ImageError, ImageResult};
use crate::filters;
use crate::image::Image;

/// Entry point shared by every registered filter.
pub type FilterFn = fn(&mut Image, &[String], &mut dyn RngCore) -> ImageResult<()>;

/// A registered filter.
#[derive(Clone)]
pub struct FilterSpec {
    /// Primary name, used on the command line as `-name`.
    pub name: &'static str,
    /// Alternative names resolving to the same filter.
    pub aliases: &'static [&'static str],
    /// Argument names for help output, e.g. `"width height"`.
    pub usage: &'static str,
    /// One-line description.
    pub summary: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub apply: FilterFn,
}

impl std::fmt::Debug for FilterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterSpec")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish()
    }
}

/// Name-indexed table of filters.
#[derive(Debug, Default, Clone)]
pub struct FilterRegistry {
    filters: Vec<FilterSpec>,
    by_name: HashMap<&'static str, usize>,
}

impl FilterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in filter, in help order.
    pub fn standard() -> Self {
        let mut registry = Self::new();

        registry.register(FilterSpec {
            name: "crop",
            aliases: &[],
            usage: "width height",
            summary: "Crop image to the top-left region",
            min_args: 2,
            max_args: 2,
            apply: |image, args, _| {
                let width = parse_int("crop", args, 0, "width")?;
                let height = parse_int("crop", args, 1, "height")?;
                filters::crop_in_place(image, width, height)
            },
        });
        registry.register(FilterSpec {
            name: "gs",
            aliases: &["grayscale"],
            usage: "",
            summary: "Convert to grayscale",
            min_args: 0,
            max_args: 0,
            apply: |image, _, _| {
                filters::grayscale(image);
                Ok(())
            },
        });
        registry.register(FilterSpec {
            name: "neg",
            aliases: &["negative"],
            usage: "",
            summary: "Convert to negative",
            min_args: 0,
            max_args: 0,
            apply: |image, _, _| {
                filters::negative(image);
                Ok(())
            },
        });
        registry.register(FilterSpec {
            name: "sharp",
            aliases: &["sharpen"],
            usage: "",
            summary: "Apply sharpening",
            min_args: 0,
            max_args: 0,
            apply: |image, _, _| filters::sharpen(image),
        });
        registry.register(FilterSpec {
            name: "edge",
            aliases: &["edge_detection"],
            usage: "threshold",
            summary: "Edge detection, threshold in [0, 1]",
            min_args: 1,
            max_args: 1,
            apply: |image, args, _| {
                let threshold = parse_decimal("edge", args, 0, "threshold")?;
                filters::edge_detection(image, threshold)
            },
        });
        registry.register(FilterSpec {
            name: "med",
            aliases: &["median"],
            usage: "window_size",
            summary: "Median filter, odd window size",
            min_args: 1,
            max_args: 1,
            apply: |image, args, _| {
                let window = parse_int("med", args, 0, "window_size")?;
                let window = usize::try_from(window).map_err(|_| {
                    ImageError::Validation(format!(
                        "med: window size must be a positive odd number, got {}",
                        window
                    ))
                })?;
                filters::median(image, window)
            },
        });
        registry.register(FilterSpec {
            name: "blur",
            aliases: &["gaussian_blur"],
            usage: "sigma",
            summary: "Gaussian blur",
            min_args: 1,
            max_args: 1,
            apply: |image, args, _| {
                let sigma = parse_decimal("blur", args, 0, "sigma")?;
                filters::gaussian_blur(image, sigma)
            },
        });
        registry.register(FilterSpec {
            name: "crystallize",
            aliases: &[],
            usage: "",
            summary: "Crystallize effect (Voronoi cells)",
            min_args: 0,
            max_args: 0,
            apply: |image, _, rng| filters::crystallize(image, rng),
        });
        registry.register(FilterSpec {
            name: "glass",
            aliases: &["glass_distortion"],
            usage: "",
            summary: "Glass distortion effect",
            min_args: 0,
            max_args: 0,
            apply: |image, _, rng| filters::glass_distortion(image, rng),
        });
        registry.register(FilterSpec {
            name: "sepia",
            aliases: &[],
            usage: "",
            summary: "Apply sepia tone",
            min_args: 0,
            max_args: 0,
            apply: |image, _, _| {
                filters::sepia(image);
                Ok(())
            },
        });
        registry.register(FilterSpec {
            name: "vignette",
            aliases: &[],
            usage: "",
            summary: "Apply vignette effect",
            min_args: 0,
            max_args: 0,
            apply: |image, _, _| filters::vignette(image),
        });

        registry
    }

    /// Adds a filter. A name or alias already present is rebound to it.
    pub fn register(&mut self, spec: FilterSpec) {
        let index = self.filters.len();
        self.by_name.insert(spec.name, index);
        for &alias in spec.aliases {
            self.by_name.insert(alias, index);
        }
        self.filters.push(spec);
    }

    /// Looks up a filter by name or alias.
    pub fn get(&self, name: &str) -> Option<&FilterSpec> {
        self.by_name.get(name).map(|&i| &self.filters[i])
    }

    /// Registered filters in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FilterSpec> {
        self.filters.iter()
    }

    /// Primary filter names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.filters.iter().map(|spec| spec.name)
    }

    /// Runs the filter `name` on `image`.
    ///
    /// Fails with [`ImageError::UnknownFilter`] for an unregistered name and
    /// with [`ImageError::Validation`] when the argument count is outside the
    /// filter's arity; the image is untouched in both cases.
    pub fn apply(
        &self,
        name: &str,
        image: &mut Image,
        args: &[String],
        rng: &mut dyn RngCore,
    ) -> ImageResult<()> {
        let spec = self
            .get(name)
            .ok_or_else(|| ImageError::UnknownFilter(name.to_string()))?;
        if args.len() < spec.min_args || args.len() > spec.max_args {
            return Err(ImageError::Validation(format!(
                "invalid number of arguments for filter {}: expected {}, got {}",
                name,
                arity(spec),
                args.len()
            )));
        }
        trace!(name, resolved = spec.name, ?args, "Dispatching filter");
        (spec.apply)(image, args, rng)
    }

    /// Runs a parsed chain in order, stopping at the first failure.
    pub fn apply_chain(
        &self,
        image: &mut Image,
        chain: &[FilterCall],
        rng: &mut dyn RngCore,
    ) -> ImageResult<()> {
        for call in chain {
            debug!(filter = %call.name, args = ?call.args, "Applying filter");
            self.apply(&call.name, image, &call.args, rng)?;
        }
        Ok(())
    }

    /// Usage table listing every filter.
    pub fn help(&self) -> String {
        let mut out = String::new();
        out.push_str("Usage: image_craft [OPTIONS] <input.bmp> <output.bmp> [filters...]\n");
        out.push_str("\nFilters:\n");
        for spec in &self.filters {
            let invocation = if spec.usage.is_empty() {
                format!("-{}", spec.name)
            } else {
                format!("-{} {}", spec.name, spec.usage)
            };
            out.push_str(&format!("  {:<24}{}", invocation, spec.summary));
            if !spec.aliases.is_empty() {
                let aliases: Vec<String> = spec.aliases.iter().map(|a| format!("-{}", a)).collect();
                out.push_str(&format!(" (alias: {})", aliases.join(", ")));
            }
            out.push('\n');
        }
        out.push_str("\nExamples:\n");
        out.push_str("  image_craft input.bmp output.bmp -crop 800 600 -gs -blur 0.5\n");
        out.push_str("  image_craft input.bmp output.bmp -neg -vignette\n");
        out.push_str("  image_craft --seed 7 input.bmp output.bmp -crystallize -sepia\n");
        out
    }
}

fn arity(spec: &FilterSpec) -> String {
    if spec.min_args == spec.max_args {
        spec.min_args.to_string()
    } else {
        format!("{} to {}", spec.min_args, spec.max_args)
    }
}

/// One filter invocation from a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCall {
    pub name: String,
    pub args: Vec<String>,
}

/// Splits command-line tokens into filter invocations.
///
/// A token starting with `-` and followed by anything other than a digit or
/// `.` names a filter; the tokens after it, up to the next filter token, are
/// its arguments. Negative numbers such as `-3` stay arguments. Tokens before
/// the first filter are rejected.
pub fn parse_chain<S: AsRef<str>>(tokens: &[S]) -> ImageResult<Vec<FilterCall>> {
    let mut chain: Vec<FilterCall> = Vec::new();
    for token in tokens {
        let token = token.as_ref();
        if let Some(name) = filter_name(token) {
            chain.push(FilterCall {
                name: name.to_string(),
                args: Vec::new(),
            });
        } else if let Some(call) = chain.last_mut() {
            call.args.push(token.to_string());
        } else {
            return Err(ImageError::Validation(format!(
                "expected a filter such as -gs, got '{}'",
                token
            )));
        }
    }
    Ok(chain)
}

fn filter_name(token: &str) -> Option<&str> {
    let name = token.strip_prefix('-')?;
    match name.chars().next() {
        Some(c) if !c.is_ascii_digit() && c != '.' => Some(name),
        _ => None,
    }
}

/// Integer argument `index` of `filter`.
pub fn parse_int(filter: &str, args: &[String], index: usize, what: &str) -> ImageResult<i64> {
    let raw = argument(filter, args, index, what)?;
    raw.trim().parse::<i64>().map_err(|_| {
        ImageError::Validation(format!("{}: {} must be an integer, got '{}'", filter, what, raw))
    })
}

/// Decimal argument `index` of `filter`.
pub fn parse_decimal(filter: &str, args: &[String], index: usize, what: &str) -> ImageResult<f32> {
    let raw = argument(filter, args, index, what)?;
    raw.trim().parse::<f32>().map_err(|_| {
        ImageError::Validation(format!("{}: {} must be a number, got '{}'", filter, what, raw))
    })
}

fn argument<'a>(filter: &str, args: &'a [String], index: usize, what: &str) -> ImageResult<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| ImageError::Validation(format!("{}: missing {}", filter, what)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_standard_has_all_filters() {
        let registry = FilterRegistry::standard();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(
            names,
            [
                "crop", "gs", "neg", "sharp", "edge", "med", "blur", "crystallize", "glass",
                "sepia", "vignette"
            ]
        );
    }

    #[test]
    fn test_aliases_resolve() {
        let registry = FilterRegistry::standard();
        for (alias, name) in [
            ("grayscale", "gs"),
            ("negative", "neg"),
            ("sharpen", "sharp"),
            ("edge_detection", "edge"),
            ("median", "med"),
            ("gaussian_blur", "blur"),
            ("glass_distortion", "glass"),
        ] {
            assert_eq!(registry.get(alias).map(|s| s.name), Some(name));
        }
        assert!(registry.get("emboss").is_none());
    }

    #[test]
    fn test_apply_unknown_filter() {
        let registry = FilterRegistry::standard();
        let mut img = Image::new(2, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            registry.apply("nope", &mut img, &[], &mut rng),
            Err(ImageError::UnknownFilter(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_apply_checks_arity_before_running() {
        let registry = FilterRegistry::standard();
        let mut img = Image::filled(3, 3, Rgb::gray(0.25)).unwrap();
        let before = img.clone();
        let mut rng = StdRng::seed_from_u64(0);

        let err = registry.apply("crop", &mut img, &strings(&["2"]), &mut rng);
        assert!(matches!(err, Err(ImageError::Validation(_))));
        let err = registry.apply("neg", &mut img, &strings(&["1"]), &mut rng);
        assert!(matches!(err, Err(ImageError::Validation(_))));
        assert_eq!(img, before);
    }

    #[test]
    fn test_apply_rejects_unparsable_argument() {
        let registry = FilterRegistry::standard();
        let mut img = Image::new(3, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        for (name, arg) in [("blur", "abc"), ("med", "3.5"), ("edge", "")] {
            assert!(matches!(
                registry.apply(name, &mut img, &strings(&[arg]), &mut rng),
                Err(ImageError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_apply_negative_median_window() {
        let registry = FilterRegistry::standard();
        let mut img = Image::new(3, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            registry.apply("median", &mut img, &strings(&["-3"]), &mut rng),
            Err(ImageError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_chain_groups_arguments() {
        let chain = parse_chain(&["-crop", "800", "600", "-gs", "-blur", "0.5"]).unwrap();
        assert_eq!(
            chain,
            vec![
                FilterCall { name: "crop".into(), args: strings(&["800", "600"]) },
                FilterCall { name: "gs".into(), args: vec![] },
                FilterCall { name: "blur".into(), args: strings(&["0.5"]) },
            ]
        );
    }

    #[test]
    fn test_parse_chain_keeps_negative_numbers() {
        let chain = parse_chain(&["-crop", "-5", "3", "-edge", "-.5"]).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].args, strings(&["-5", "3"]));
        assert_eq!(chain[1].args, strings(&["-.5"]));
    }

    #[test]
    fn test_parse_chain_rejects_leading_argument() {
        assert!(matches!(
            parse_chain(&["5", "-gs"]),
            Err(ImageError::Validation(_))
        ));
        assert!(parse_chain::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_help_lists_every_filter() {
        let registry = FilterRegistry::standard();
        let help = registry.help();
        for spec in registry.iter() {
            assert!(help.contains(&format!("-{}", spec.name)));
        }
        assert!(help.contains("-crop width height"));
        assert!(help.contains("-grayscale"));

        let gs_line = help
            .lines()
            .find(|line| line.trim_start().starts_with("-gs "))
            .unwrap();
        assert!(gs_line.ends_with("(alias: -grayscale)"));
        let crop_line = help
            .lines()
            .find(|line| line.trim_start().starts_with("-crop "))
            .unwrap();
        assert!(!crop_line.contains("alias"));
    }
}

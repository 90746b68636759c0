//! Manual-mode output: inertial values of one mesh as URDF or SDF markup

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::format::format_shortest;
use crate::inertia::InertialValues;

/// Markup flavor of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Single `<inertia key="value" … />` tag
    #[default]
    Urdf,
    /// One `<key>value</key>` tag per line
    Sdf,
}

impl OutputFormat {
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Urdf => "urdf",
            OutputFormat::Sdf => "sdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "urdf" => Ok(OutputFormat::Urdf),
            "sdf" => Ok(OutputFormat::Sdf),
            other => Err(format!("unknown format '{}' (expected urdf or sdf)", other)),
        }
    }
}

/// Header line naming the mesh, mass, volume and format
pub fn render_header(mesh_path: &Path, values: &InertialValues, format: OutputFormat) -> String {
    format!(
        "Using {} of {} kg (volume {} m^3) with {} format:",
        mesh_path.display(),
        format_shortest(values.mass),
        format_shortest(values.volume),
        format
    )
}

/// Markup body listing the nine inertial keys
pub fn render_body(values: &InertialValues, format: OutputFormat) -> String {
    let entries = values.entries();
    match format {
        OutputFormat::Urdf => {
            let mut out = String::from("<inertia ");
            for (key, value) in entries {
                out.push_str(&format!("{}=\"{}\" ", key, format_shortest(value)));
            }
            out.push_str("/>");
            out
        }
        OutputFormat::Sdf => entries
            .iter()
            .map(|(key, value)| format!("<{key}>{}</{key}>\n", format_shortest(*value)))
            .collect(),
    }
}

/// Full report: header line followed by the markup body
pub fn render(mesh_path: &Path, values: &InertialValues, format: OutputFormat) -> String {
    format!(
        "{}\n{}",
        render_header(mesh_path, values, format),
        render_body(values, format)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inertia::InertiaMatrix;

    fn sample_values() -> InertialValues {
        InertialValues {
            x: 2.2730923034962195e-20,
            y: -2.545863379915766e-18,
            z: -0.08068086184488206,
            inertia: InertiaMatrix {
                ixx: 0.017670542003119606,
                ixy: -1.6880057143163227e-08,
                ixz: 5.23434120494016e-21,
                iyy: 0.01691343657012847,
                iyz: 3.295826741253291e-19,
                izz: 0.0011246971086764758,
            },
            mass: 1.36,
            volume: 0.0005822416353481113,
            convex_hull: false,
        }
    }

    fn keys_in(text: &str, pattern: fn(&str) -> Option<&str>) -> Vec<String> {
        text.split(|c: char| c == ' ' || c == '\n')
            .filter_map(pattern)
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("urdf".parse::<OutputFormat>().unwrap(), OutputFormat::Urdf);
        assert_eq!("SDF".parse::<OutputFormat>().unwrap(), OutputFormat::Sdf);
        assert!("mjcf".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Sdf.to_string(), "sdf");
    }

    #[test]
    fn test_sdf_body() {
        let body = render_body(&sample_values(), OutputFormat::Sdf);
        let expected = "<x>2.2730923034962195e-20</x>\n\
                        <y>-2.545863379915766e-18</y>\n\
                        <z>-0.08068086184488206</z>\n\
                        <ixx>0.017670542003119606</ixx>\n\
                        <ixy>-1.6880057143163227e-08</ixy>\n\
                        <ixz>5.23434120494016e-21</ixz>\n\
                        <iyy>0.01691343657012847</iyy>\n\
                        <iyz>3.295826741253291e-19</iyz>\n\
                        <izz>0.0011246971086764758</izz>\n";
        assert_eq!(body, expected);
    }

    #[test]
    fn test_urdf_body() {
        let body = render_body(&sample_values(), OutputFormat::Urdf);
        assert!(body.starts_with("<inertia x=\"2.2730923034962195e-20\" y="));
        assert!(body.ends_with("izz=\"0.0011246971086764758\" />"));
        assert!(!body.contains("mass"));
        assert!(!body.contains("volume"));
    }

    #[test]
    fn test_formats_share_keys_and_order() {
        let values = sample_values();
        let urdf = render_body(&values, OutputFormat::Urdf);
        let sdf = render_body(&values, OutputFormat::Sdf);

        let urdf_keys = keys_in(&urdf, |tok| tok.split_once('=').map(|(k, _)| k));
        let sdf_keys = keys_in(&sdf, |tok| {
            tok.strip_prefix('<')
                .and_then(|rest| rest.split_once('>'))
                .map(|(k, _)| k)
        });

        assert_eq!(urdf_keys, InertialValues::KEYS);
        assert_eq!(sdf_keys, InertialValues::KEYS);
    }

    #[test]
    fn test_header_echoes_mass_and_volume() {
        let header = render_header(Path::new("ee.stl"), &sample_values(), OutputFormat::Urdf);
        assert_eq!(
            header,
            "Using ee.stl of 1.36 kg (volume 0.0005822416353481113 m^3) with urdf format:"
        );

        let full = render(Path::new("ee.stl"), &sample_values(), OutputFormat::Sdf);
        assert_eq!(full.lines().count(), 10);
    }
}

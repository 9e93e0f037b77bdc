//! Static OpenSCAD reference served by the documentation tools.

use thiserror::Error;

/// Lookup failures for reference categories and quick-help topics.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// No reference category has this key
    #[error("category '{category}' not found. Available: {available}")]
    UnknownCategory {
        /// Requested category, normalized
        category: String,
        /// Comma-separated list of valid keys
        available: String,
    },
    /// No quick-help entry has this key
    #[error("topic '{topic}' not found. Available: {available}")]
    UnknownTopic {
        /// Requested topic, as supplied
        topic: String,
        /// Comma-separated list of valid keys
        available: String,
    },
}

struct Section {
    key: &'static str,
    /// Title for full sections; quick lists are titled from the key.
    title: Option<&'static str>,
    summary: &'static str,
    body: &'static str,
}

struct QuickTopic {
    key: &'static str,
    usage: &'static str,
    example: &'static str,
}

const SYNTAX: &str = "\
OpenSCAD language: syntax and rules

Language model
OpenSCAD describes solid models as text. Programs are declarative and are
built from modules (which produce geometry) and functions (which compute
values).

Core forms
- Assignment: name = value;
- Conditional value: name = cond ? a : b;
- Function: function name(a, b) = expression;
- Module: module name(a, b) { ... }
- include <file.scad> pulls in everything, including top-level variables
- use <file.scad> imports only modules and functions

Scoping
- Variables behave like constants that can be overridden per scope
- Assignments never leak into an enclosing scope
- Within one scope the last assignment wins everywhere
- Module and function names are case sensitive

Flow control
- if (a) { ... } else if (b) { ... } else { ... }
- for (i = [start : step : end]) { ... }
- for (v = [list, of, values]) { ... }
- intersection_for (i = [1:6]) { ... }
- List comprehension: [ for (i = range) if (cond) i ]
";

const PRIMITIVES: &str = "\
3D primitives
- cube(size, center) or cube([x, y, z], center)
- sphere(r = radius) or sphere(d = diameter)
- cylinder(h, r|d, center) or cylinder(h, r1|d1, r2|d2, center) for cones
- polyhedron(points, faces, convexity)

2D primitives (XY plane, extrude to get solids)
- circle(r = radius) or circle(d = diameter)
- square(size, center) or square([x, y], center)
- polygon(points, paths)
- text(t, size, font, ...)
- projection(cut = true) flattens a 3D child onto the XY plane
";

const OPERATIONS: &str = "\
Constructive solid geometry
- union() { a; b; } merges children into one object
- difference() { base; cut1; cut2; } subtracts later children from the first
- intersection() { a; b; } keeps only the shared volume

Transformations
- translate([x, y, z]) moves children
- rotate([x, y, z]) or rotate(angle, [x, y, z]) rotates children
- scale([x, y, z]) scales along each axis
- resize([x, y, z], auto = false) scales to fit exact dimensions
- mirror([x, y, z]) reflects across the plane with that normal
- multmatrix(m) applies a 4x4 affine matrix

Shape operations
- hull() { a; b; } convex hull of all children
- minkowski() { a; b; } Minkowski sum
- offset(r | delta, chamfer) grows or shrinks 2D outlines
- linear_extrude(height, twist, ...) sweeps a 2D shape along Z
- rotate_extrude(angle, ...) revolves a 2D shape around Z
- surface(file = \"...\", center) builds a height-map solid
";

const VARIABLES: &str = "\
Resolution
- $fn = 0: fixed number of fragments; overrides $fa and $fs when > 0
- $fa = 12: minimum angle per fragment, in degrees
- $fs = 2: minimum fragment length

Modifier characters
- # highlights a subtree in translucent red for debugging
- % draws a subtree as transparent background, excluded from CSG
- ! renders only this subtree
- * disables a subtree entirely

Other special variables
- $children: number of children passed to the current module
- $preview: true in preview (F5), false in full render (F6)
- $t: animation step, from 0 to 1

Utilities
- echo(\"value:\", x) prints to the console
- assert(x > 0, \"x must be positive\") stops on a false condition
- children(0) instantiates the first child inside a module
- render() { ... } forces a full CGAL render of its children
";

const BEST_PRACTICES: &str = "\
Parameterization
- Drive every dimension from a named variable
- Keep related parameters together at the top of the file
- Prefer descriptive names (wall_thickness, not wt)

Modules
- Split complex parts into small modules
- Name modules after what they produce
- Document module parameters and units

Performance
- Keep $fn modest; high values slow rendering sharply
- Prefer $fa and $fs for size-adaptive resolution
- Wrap expensive recursive geometry in render()
- Avoid difference() with very many children

Debugging
- Use # to see intermediate geometry
- Use % for reference geometry that must not affect the result
- echo() intermediate values
- Test modules on their own before combining them

STL export
- Make sure the result is manifold
- Check for consistent normals before printing
- Choose a resolution that suits the printed size
- Confirm dimensions are in the intended units
";

const SECTIONS: &[Section] = &[
    Section {
        key: "syntax",
        title: Some("Syntax and Rules"),
        summary: "Language syntax and rules",
        body: SYNTAX,
    },
    Section {
        key: "primitives",
        title: Some("Primitives"),
        summary: "2D and 3D primitive shapes",
        body: PRIMITIVES,
    },
    Section {
        key: "operations",
        title: Some("Operations and Transformations"),
        summary: "CSG operations and transformations",
        body: OPERATIONS,
    },
    Section {
        key: "variables",
        title: Some("Special Variables and Modifiers"),
        summary: "Special variables and modifiers",
        body: VARIABLES,
    },
    Section {
        key: "bestpractices",
        title: Some("Best Practices"),
        summary: "Design patterns and optimization",
        body: BEST_PRACTICES,
    },
    Section {
        key: "3d",
        title: None,
        summary: "Quick 3D primitive reference",
        body: "cube(), sphere(), cylinder(), polyhedron()",
    },
    Section {
        key: "2d",
        title: None,
        summary: "Quick 2D primitive reference",
        body: "circle(), square(), polygon(), text()",
    },
    Section {
        key: "transformations",
        title: None,
        summary: "Quick transformation reference",
        body: "translate(), rotate(), scale(), mirror(), resize()",
    },
    Section {
        key: "boolean",
        title: None,
        summary: "Quick boolean operations reference",
        body: "union(), difference(), intersection()",
    },
    Section {
        key: "extrusions",
        title: None,
        summary: "Quick extrusion operations reference",
        body: "linear_extrude(), rotate_extrude()",
    },
];

const TOPICS: &[QuickTopic] = &[
    QuickTopic {
        key: "cube",
        usage: "cube(size, center) - box with its corner (or center) at the origin",
        example: "cube([10, 20, 5], center = true);",
    },
    QuickTopic {
        key: "sphere",
        usage: "sphere(r = radius) or sphere(d = diameter)",
        example: "sphere(r = 10, $fn = 50);",
    },
    QuickTopic {
        key: "cylinder",
        usage: "cylinder(h, r|d, center) - cylinder, or cone with r1/r2",
        example: "cylinder(h = 20, r1 = 10, r2 = 5, center = true);",
    },
    QuickTopic {
        key: "translate",
        usage: "translate([x, y, z]) { ... } - move children",
        example: "translate([5, 0, 0]) cube(10);",
    },
    QuickTopic {
        key: "rotate",
        usage: "rotate([x, y, z]) { ... } - rotate children, degrees per axis",
        example: "rotate([0, 0, 45]) cube(10);",
    },
    QuickTopic {
        key: "difference",
        usage: "difference() { base; cut1; cut2; } - subtract from the first child",
        example: "difference() { cube(10); cylinder(h = 15, r = 3); }",
    },
    QuickTopic {
        key: "module",
        usage: "module name(params) { ... } - reusable geometry",
        example: "module box(size) { cube(size); }",
    },
    QuickTopic {
        key: "extrude",
        usage: "linear_extrude(height, twist, ...) { shape2d; } - 2D to 3D",
        example: "linear_extrude(10) circle(5);",
    },
    QuickTopic {
        key: "variables",
        usage: "$fn, $fa, $fs control resolution; modifiers # % ! *",
        example: "sphere(5, $fn = 64);",
    },
];

/// The language syntax section.
pub fn syntax() -> &'static str {
    SYNTAX
}

/// Look up a reference category.
///
/// Keys are trimmed and case-insensitive. An empty key returns the index of
/// categories.
pub fn reference(category: &str) -> Result<String, ReferenceError> {
    let key = category.trim().to_lowercase();
    if key.is_empty() {
        let mut out = String::from("Available OpenSCAD reference categories:\n\n");
        for section in SECTIONS {
            out.push_str(&format!("- {} - {}\n", section.key, section.summary));
        }
        return Ok(out);
    }

    let section = SECTIONS
        .iter()
        .find(|s| s.key == key)
        .ok_or_else(|| ReferenceError::UnknownCategory {
            available: SECTIONS.iter().map(|s| s.key).collect::<Vec<_>>().join(", "),
            category: key.clone(),
        })?;

    Ok(match section.title {
        Some(title) => format!("{title}\n{}", section.body),
        None => format!("{} functions:\n{}", section.key.to_uppercase(), section.body),
    })
}

/// Look up a quick-help topic.
///
/// Keys are trimmed and case-insensitive. An empty key returns the list of
/// topics.
pub fn quick_help(topic: &str) -> Result<String, ReferenceError> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        let keys: Vec<_> = TOPICS.iter().map(|t| t.key).collect();
        return Ok(format!(
            "Quick OpenSCAD reference - available topics:\n- {}",
            keys.join("\n- ")
        ));
    }

    let key = trimmed.to_lowercase();
    let entry = TOPICS
        .iter()
        .find(|t| t.key == key)
        .ok_or_else(|| ReferenceError::UnknownTopic {
            topic: trimmed.to_string(),
            available: TOPICS.iter().map(|t| t.key).collect::<Vec<_>>().join(", "),
        })?;

    Ok(format!(
        "{}:\n{}\nExample: {}",
        capitalize(&key),
        entry.usage,
        entry.example
    ))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

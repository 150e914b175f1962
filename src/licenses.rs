//! NF-015: Fixed SPDX license list and fuzzy search.
//!
//! Copyright entries using the SPDX form must resolve against this list.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// One SPDX license.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct License {
    pub id: &'static str,
    pub name: &'static str,
}

/// The fixed list authoring validates against.
pub const LICENSES: &[License] = &[
    License { id: "AFL-3.0", name: "Academic Free License v3.0" },
    License { id: "AGPL-3.0-only", name: "GNU Affero General Public License v3.0 only" },
    License { id: "AGPL-3.0-or-later", name: "GNU Affero General Public License v3.0 or later" },
    License { id: "Apache-1.1", name: "Apache License 1.1" },
    License { id: "Apache-2.0", name: "Apache License 2.0" },
    License { id: "Artistic-2.0", name: "Artistic License 2.0" },
    License { id: "BSD-2-Clause", name: "BSD 2-Clause \"Simplified\" License" },
    License { id: "BSD-3-Clause", name: "BSD 3-Clause \"New\" or \"Revised\" License" },
    License { id: "BSD-4-Clause", name: "BSD 4-Clause \"Original\" or \"Old\" License" },
    License { id: "BSL-1.0", name: "Boost Software License 1.0" },
    License { id: "CC-BY-3.0", name: "Creative Commons Attribution 3.0 Unported" },
    License { id: "CC-BY-4.0", name: "Creative Commons Attribution 4.0 International" },
    License { id: "CC-BY-NC-4.0", name: "Creative Commons Attribution Non Commercial 4.0 International" },
    License { id: "CC-BY-NC-ND-4.0", name: "Creative Commons Attribution Non Commercial No Derivatives 4.0 International" },
    License { id: "CC-BY-NC-SA-4.0", name: "Creative Commons Attribution Non Commercial Share Alike 4.0 International" },
    License { id: "CC-BY-SA-4.0", name: "Creative Commons Attribution Share Alike 4.0 International" },
    License { id: "CC-PDDC", name: "Creative Commons Public Domain Dedication and Certification" },
    License { id: "CC0-1.0", name: "Creative Commons Zero v1.0 Universal" },
    License { id: "CDDL-1.0", name: "Common Development and Distribution License 1.0" },
    License { id: "CECILL-2.1", name: "CeCILL Free Software License Agreement v2.1" },
    License { id: "ECL-2.0", name: "Educational Community License v2.0" },
    License { id: "EPL-1.0", name: "Eclipse Public License 1.0" },
    License { id: "EPL-2.0", name: "Eclipse Public License 2.0" },
    License { id: "EUPL-1.2", name: "European Union Public License 1.2" },
    License { id: "GPL-2.0-only", name: "GNU General Public License v2.0 only" },
    License { id: "GPL-2.0-or-later", name: "GNU General Public License v2.0 or later" },
    License { id: "GPL-3.0-only", name: "GNU General Public License v3.0 only" },
    License { id: "GPL-3.0-or-later", name: "GNU General Public License v3.0 or later" },
    License { id: "ISC", name: "ISC License" },
    License { id: "LGPL-2.1-only", name: "GNU Lesser General Public License v2.1 only" },
    License { id: "LGPL-2.1-or-later", name: "GNU Lesser General Public License v2.1 or later" },
    License { id: "LGPL-3.0-only", name: "GNU Lesser General Public License v3.0 only" },
    License { id: "LGPL-3.0-or-later", name: "GNU Lesser General Public License v3.0 or later" },
    License { id: "MIT", name: "MIT License" },
    License { id: "MPL-1.1", name: "Mozilla Public License 1.1" },
    License { id: "MPL-2.0", name: "Mozilla Public License 2.0" },
    License { id: "MS-PL", name: "Microsoft Public License" },
    License { id: "NCSA", name: "University of Illinois/NCSA Open Source License" },
    License { id: "OFL-1.1", name: "SIL Open Font License 1.1" },
    License { id: "OSL-3.0", name: "Open Software License 3.0" },
    License { id: "PostgreSQL", name: "PostgreSQL License" },
    License { id: "PSF-2.0", name: "Python Software Foundation License 2.0" },
    License { id: "Unlicense", name: "The Unlicense" },
    License { id: "Vim", name: "Vim License" },
    License { id: "WTFPL", name: "Do What The F*ck You Want To Public License" },
    License { id: "Zlib", name: "zlib License" },
];

/// Resolve an SPDX identifier (case-insensitive).
pub fn find(id: &str) -> Option<&'static License> {
    LICENSES.iter().find(|l| l.id.eq_ignore_ascii_case(id))
}

/// Fuzzy-search identifiers and names, best matches first.
pub fn search(query: &str, limit: usize) -> Vec<&'static License> {
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &'static License)> = LICENSES
        .iter()
        .filter_map(|license| {
            let id_score = matcher.fuzzy_match(license.id, query);
            let name_score = matcher.fuzzy_match(license.name, query);
            id_score.max(name_score).map(|score| (score, license))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.id.cmp(b.1.id)));
    scored.into_iter().take(limit).map(|(_, l)| l).collect()
}

pub struct Keybinding {
    pub keys: &'static str,
    pub description: &'static str,
}

pub struct KeybindingCategory {
    pub name: &'static str,
    pub bindings: &'static [Keybinding],
}

pub const KEYBINDING_CATEGORIES: &[KeybindingCategory] = &[
    KeybindingCategory {
        name: "Navigation",
        bindings: &[
            Keybinding {
                keys: "j/k",
                description: "Move selection down/up",
            },
            Keybinding {
                keys: "Tab/Shift+Tab",
                description: "Next/previous sidebar tab",
            },
            Keybinding {
                keys: "Enter",
                description: "Centre map on selection",
            },
            Keybinding {
                keys: "h/l",
                description: "Previous/next sidebar tab",
            },
        ],
    },
    KeybindingCategory {
        name: "Map",
        bindings: &[
            Keybinding {
                keys: "+/-",
                description: "Zoom in/out",
            },
            Keybinding {
                keys: "1/2/3/4",
                description: "Toggle friends/locations/weather/disasters layer",
            },
            Keybinding {
                keys: "w",
                description: "Refresh weather and disasters at map centre",
            },
            Keybinding {
                keys: "c",
                description: "Centre map on your own position",
            },
            Keybinding {
                keys: "m",
                description: "Cycle through map markers",
            },
            Keybinding {
                keys: "Esc",
                description: "Clear the map marker pick",
            },
            Keybinding {
                keys: "p",
                description: "Share the map centre as your position",
            },
        ],
    },
    KeybindingCategory {
        name: "Friends & Places",
        bindings: &[
            Keybinding {
                keys: "a",
                description: "Send friend request",
            },
            Keybinding {
                keys: "y/x",
                description: "Accept/reject selected request",
            },
            Keybinding {
                keys: "n",
                description: "Add location at map centre",
            },
        ],
    },
    KeybindingCategory {
        name: "Safety",
        bindings: &[
            Keybinding {
                keys: "s",
                description: "Mark yourself safe",
            },
            Keybinding {
                keys: "!",
                description: "Send emergency alert (asks first)",
            },
            Keybinding {
                keys: "D",
                description: "Report danger (asks first)",
            },
        ],
    },
    KeybindingCategory {
        name: "Session",
        bindings: &[
            Keybinding {
                keys: "r",
                description: "Refresh now",
            },
            Keybinding {
                keys: "L",
                description: "Sign in (when signed out)",
            },
            Keybinding {
                keys: "o",
                description: "Sign out",
            },
            Keybinding {
                keys: "?",
                description: "Toggle help",
            },
            Keybinding {
                keys: "q",
                description: "Quit",
            },
        ],
    },
    KeybindingCategory {
        name: "Dialogs",
        bindings: &[
            Keybinding {
                keys: "Tab/Up/Down",
                description: "Switch field",
            },
            Keybinding {
                keys: "Left/Right",
                description: "Change location type",
            },
            Keybinding {
                keys: "Ctrl+r",
                description: "Switch between sign in and register",
            },
            Keybinding {
                keys: "Enter",
                description: "Submit / confirm",
            },
            Keybinding {
                keys: "Esc",
                description: "Cancel",
            },
        ],
    },
];

/// Total number of lines the help panel renders, used to bound scrolling.
pub fn help_content_height() -> usize {
    // title + blank, then per category: name + bindings + blank
    2 + KEYBINDING_CATEGORIES
        .iter()
        .map(|c| c.bindings.len() + 2)
        .sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_height_counts_every_line() {
        let bindings: usize = KEYBINDING_CATEGORIES.iter().map(|c| c.bindings.len()).sum();
        assert_eq!(
            help_content_height(),
            2 + bindings + 2 * KEYBINDING_CATEGORIES.len()
        );
    }

    #[test]
    fn test_no_duplicate_keys_outside_dialogs() {
        let mut seen = std::collections::HashSet::new();
        for category in KEYBINDING_CATEGORIES.iter().filter(|c| c.name != "Dialogs") {
            for binding in category.bindings {
                assert!(seen.insert(binding.keys), "duplicate binding {}", binding.keys);
            }
        }
    }
}

use crate::table::PROJECTS;
use crate::types::CommandDescriptor;

/// Finds the descriptor for `(prj_id, cls_id, cmd_id)` by linear scan of the
/// static three-level table. Matching short-circuits: if the project exists
/// but the class does not, `None` is returned immediately without scanning
/// the remaining projects.
pub fn find_descriptor(prj_id: u8, cls_id: u8, cmd_id: u16) -> Option<&'static CommandDescriptor> {
    for project in PROJECTS {
        if project.prj_id != prj_id {
            continue;
        }

        for class in project.classes {
            if class.cls_id != cls_id {
                continue;
            }

            return class.commands.iter().find(|cmd| cmd.cmd_id == cmd_id);
        }

        return None;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_known_command() {
        let desc = find_descriptor(1, 1, 0).expect("GPSFixStateChanged");
        assert_eq!(desc.name, "GPSFixStateChanged");
    }

    #[test]
    fn unknown_project_is_none() {
        assert!(find_descriptor(200, 0, 0).is_none());
    }

    #[test]
    fn known_project_unknown_class_short_circuits() {
        // Project 1 (Ardrone3) exists, class 200 does not -- must not fall
        // through and scan other projects.
        assert!(find_descriptor(1, 200, 0).is_none());
    }

    #[test]
    fn known_class_unknown_command_is_none() {
        assert!(find_descriptor(1, 1, 999).is_none());
    }
}

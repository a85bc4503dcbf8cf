//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use isuku_i18n::core::format_output_path;
    use isuku_i18n::translation::Locale;

    #[test]
    fn as_is() {
        let final_destination = format_output_path(
            "/home/username/Downloads/website.html",
            Some(""),
            Locale::En,
        );

        assert_eq!(final_destination, "/home/username/Downloads/website.html");
    }

    #[test]
    fn substitute_title() {
        let final_destination = format_output_path(
            "/home/username/Downloads/%title%.html",
            Some("Document Title"),
            Locale::En,
        );

        assert_eq!(
            final_destination,
            "/home/username/Downloads/Document Title.html"
        );
    }

    #[test]
    fn substitute_title_multi() {
        let final_destination = format_output_path(
            "/home/username/Downloads/%title%/%title%.html",
            Some("Document Title"),
            Locale::En,
        );

        assert_eq!(
            final_destination,
            "/home/username/Downloads/Document Title/Document Title.html"
        );
    }

    #[test]
    fn sanitize() {
        let final_destination = format_output_path(
            r#"/home/username/Downloads/<>:"|?/%title%.html"#,
            Some(r#"/\<>:"|?"#),
            Locale::En,
        );

        assert_eq!(
            final_destination,
            r#"/home/username/Downloads/<>:"|?/__[] - -.html"#
        );
    }

    #[test]
    fn level_up() {
        let final_destination = format_output_path("../%title%.html", Some(".Title"), Locale::En);

        assert_eq!(final_destination, r#"../Title.html"#);
    }

    #[test]
    fn missing_title() {
        let final_destination = format_output_path("page-%title%.html", None, Locale::En);

        assert_eq!(final_destination, "page-.html");
    }

    #[test]
    fn substitute_language() {
        let final_destination = format_output_path("%title%.%lang%.html", Some("Isuku"), Locale::Rw);

        assert_eq!(final_destination, "Isuku.rw.html");
    }

    #[test]
    fn substitute_language_in_directory() {
        let final_destination = format_output_path("out/%lang%/index.html", None, Locale::Fr);

        assert_eq!(final_destination, "out/fr/index.html");
    }

    #[test]
    fn substitute_timestamp() {
        let final_destination = format_output_path("%timestamp%.html", None, Locale::En);

        assert!(final_destination.ends_with("Z.html"));
        assert!(!final_destination.contains(':'));
    }
}

/// Prompt asking the model for genre and mood of a song, as a JSON object
/// with the Italian keys the endpoint exposes.
pub fn analysis_prompt(song_title: &str) -> String {
    format!(
        "Analizza il seguente brano musicale e forniscimi il suo genere e il mood principale. \
         Rispondi in formato JSON con i campi \"genere\" (stringa) e \"umore\" (stringa). \
         Esempio: {{\"genere\": \"Pop\", \"umore\": \"allegro\"}}. Canzone: \"{}\"",
        song_title
    )
}
